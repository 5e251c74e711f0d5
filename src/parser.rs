//! Recursive-descent parsing with operator-precedence climbing.
//!
//! Binary operators are built by iterative folding (left-associative);
//! unary operators recurse into themselves (right-associative). Error
//! recovery only happens at the top-level declaration boundary: a
//! top-level declaration the parser can't classify or accept is
//! recorded, fully consumed if it was at least syntactically well-formed
//! (so recovery resumes right at the next declaration), and otherwise
//! skipped one token at a time, so later, valid declarations still
//! parse. Anything below that boundary — inside an expression, a block,
//! a function body — is a hard abort.

use crate::ast::{Expression, LiteralValue, Parameter, Program, Statement, TypeName, TypeTag};
use crate::error::{Diagnostics, ParserError};
use crate::lexer::{Token, TokenKind};
use crate::source::Located;

/// The outcome of a successful parse: the tree, plus any top-level
/// declarations that were skipped and recorded rather than fatal.
pub struct ParseOutcome {
    pub program: Program,
    pub diagnostics: Diagnostics,
}

/// Parses a complete token sequence (as produced by [`crate::lexer::tokenize`]).
///
/// Returns `Err` only when a hard parse error occurred — one raised
/// inside an expression, statement, or block. Recoverable top-level
/// errors are reported through `ParseOutcome::diagnostics` alongside a
/// successfully-returned `Program`.
pub fn parse(tokens: Vec<Token>, file_name: &str, source: &str) -> Result<ParseOutcome, Diagnostics> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        diagnostics: Diagnostics::new(file_name, source),
    };

    match parser.program() {
        Ok(program) => Ok(ParseOutcome {
            program,
            diagnostics: parser.diagnostics,
        }),
        Err(error) => {
            parser.diagnostics.push(error);
            Err(parser.diagnostics)
        }
    }
}

enum Failure {
    /// A top-level declaration that the parser couldn't classify;
    /// recoverable by skipping one token.
    Weak(Located<ParserError>),
    /// Anything below the declaration boundary; aborts the parse.
    Strict(Located<ParserError>),
}

type Parse<T> = Result<T, Failure>;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    diagnostics: Diagnostics,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.pos + offset)
            .unwrap_or_else(|| self.tokens.last().expect("tokenize always emits EOF"))
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> Parse<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else if self.is_at_end() {
            Err(self.fail_strict(ParserError::UnexpectedEof(context.to_string())))
        } else {
            let found = self.peek().to_string();
            Err(self.fail_strict(ParserError::UnexpectedToken {
                expected: context.to_string(),
                found,
            }))
        }
    }

    fn fail_strict(&self, error: ParserError) -> Failure {
        Failure::Strict(Located::at(error, self.peek().position))
    }

    fn fail_weak(&self, error: ParserError) -> Failure {
        Failure::Weak(Located::at(error, self.peek().position))
    }

    // ---- program & declarations ----------------------------------------

    fn program(&mut self) -> Result<Program, Located<ParserError>> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            let start = self.pos;
            match self.top_level_declaration() {
                Ok(statement) => items.push(Some(statement)),
                Err(Failure::Weak(error)) => {
                    self.diagnostics.push(error);
                    // A recognized-but-rejected declaration (e.g. a
                    // top-level variable) already consumed its own
                    // tokens; only skip a token here when nothing was
                    // consumed, so a single bad top-level token doesn't
                    // also eat the next, valid one.
                    if self.pos == start {
                        self.advance();
                    }
                    items.push(None);
                }
                Err(Failure::Strict(error)) => return Err(error),
            }
        }

        Ok(Program { items })
    }

    fn is_type_keyword(kind: TokenKind) -> bool {
        matches!(
            kind,
            TokenKind::Ganz | TokenKind::Komma | TokenKind::Wort | TokenKind::Jain | TokenKind::Kiste
        )
    }

    fn top_level_declaration(&mut self) -> Parse<Statement> {
        if !Self::is_type_keyword(self.peek().kind) {
            let found = self.peek().to_string();
            return Err(self.fail_weak(ParserError::InvalidTopLevelDeclaration(found)));
        }

        if self.peek_at(1).kind != TokenKind::Identifier {
            let found = self.peek_at(1).to_string();
            return Err(self.fail_weak(ParserError::InvalidTopLevelDeclaration(found)));
        }

        if self.peek_at(2).kind == TokenKind::LParen {
            self.function_declaration()
        } else {
            // A top-level variable declaration is syntactically
            // well-formed but not a valid top-level item (see
            // DESIGN.md's resolution of the original's undefined
            // behavior here). Parse it fully, so the parser resumes
            // cleanly right at the next declaration, then report it as
            // invalid rather than abort.
            let position = self.peek().position;
            self.variable_declaration()?;
            Err(Failure::Weak(Located::at(
                ParserError::InvalidTopLevelDeclaration("a variable declaration".to_string()),
                position,
            )))
        }
    }

    fn function_declaration(&mut self) -> Parse<Statement> {
        let position = self.peek().position;
        let return_type = self.type_name()?;
        let name = self.expect(TokenKind::Identifier, "function name")?.lexeme;

        self.expect(TokenKind::LParen, "'(' after function name")?;
        let parameters = if self.check(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parameters()?
        };
        self.expect(TokenKind::RParen, "')' after parameter list")?;

        let body = self.block()?;

        Ok(Statement::FunctionDeclaration {
            return_type,
            name,
            parameters,
            body: Box::new(body),
            position,
        })
    }

    fn parameters(&mut self) -> Parse<Vec<Parameter>> {
        let mut parameters = vec![self.parameter()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            parameters.push(self.parameter()?);
        }
        Ok(parameters)
    }

    fn parameter(&mut self) -> Parse<Parameter> {
        let type_name = self.type_name()?;
        let name = self.expect(TokenKind::Identifier, "parameter name")?.lexeme;
        Ok(Parameter { type_name, name })
    }

    fn type_name(&mut self) -> Parse<TypeName> {
        let base = match self.peek().kind {
            TokenKind::Ganz => TypeName::Ganz,
            TokenKind::Komma => TypeName::Komma,
            TokenKind::Wort => TypeName::Wort,
            TokenKind::Jain => TypeName::Jain,
            TokenKind::Kiste => TypeName::Kiste,
            _ => {
                let found = self.peek().to_string();
                return Err(self.fail_strict(ParserError::UnexpectedToken {
                    expected: "a type (GANZ, KOMMA, WORT, JAIN or KISTE)".to_string(),
                    found,
                }));
            }
        };
        self.advance();

        if self.check(TokenKind::LBracket) && self.peek_at(1).kind == TokenKind::RBracket {
            self.advance();
            self.advance();
            Ok(TypeName::Array(Box::new(base)))
        } else {
            Ok(base)
        }
    }

    // ---- statements ------------------------------------------------------

    fn block(&mut self) -> Parse<Statement> {
        let position = self.expect(TokenKind::LBrace, "'{'")?.position;

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.statement()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(Statement::Block { statements, position })
    }

    fn statement(&mut self) -> Parse<Statement> {
        match self.peek().kind {
            TokenKind::Drucke => self.print_statement(),
            TokenKind::Zurueck => self.return_statement(),
            TokenKind::Wenn => self.if_statement(),
            TokenKind::Solange => self.while_statement(),
            TokenKind::Fuer => self.for_statement(),
            kind if Self::is_type_keyword(kind) => self.variable_declaration(),
            TokenKind::Identifier if self.peek_at(1).kind == TokenKind::LBracket => {
                self.array_assignment()
            }
            TokenKind::Identifier if self.peek_at(1).kind == TokenKind::Assign => {
                self.assignment()
            }
            _ => {
                let found = self.peek().to_string();
                Err(self.fail_strict(ParserError::UnexpectedToken {
                    expected: "a statement".to_string(),
                    found,
                }))
            }
        }
    }

    fn print_statement(&mut self) -> Parse<Statement> {
        let position = self.expect(TokenKind::Drucke, "DRUCKE")?.position;
        self.expect(TokenKind::LParen, "'(' after DRUCKE")?;
        let expression = self.expression()?;
        self.expect(TokenKind::RParen, "')' after print argument")?;
        self.expect(TokenKind::Semicolon, "';' after DRUCKE(...)")?;
        Ok(Statement::Print { expression, position })
    }

    fn return_statement(&mut self) -> Parse<Statement> {
        let position = self.expect(TokenKind::Zurueck, "ZURUECK")?.position;
        let value = self.expression()?;
        self.expect(TokenKind::Semicolon, "';' after return value")?;
        Ok(Statement::Return { value, position })
    }

    fn if_statement(&mut self) -> Parse<Statement> {
        let position = self.expect(TokenKind::Wenn, "WENN")?.position;
        self.expect(TokenKind::LParen, "'(' after WENN")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        let then_branch = Box::new(self.block()?);

        let else_branch = if self.check(TokenKind::Sonst) {
            self.advance();
            // `SONST WENN` is parsed as a nested `if` — produces the
            // right-leaning else-if chain.
            if self.check(TokenKind::Wenn) {
                Some(Box::new(self.if_statement()?))
            } else {
                Some(Box::new(self.block()?))
            }
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            position,
        })
    }

    fn while_statement(&mut self) -> Parse<Statement> {
        let position = self.expect(TokenKind::Solange, "SOLANGE")?.position;
        self.expect(TokenKind::LParen, "'(' after SOLANGE")?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        let body = Box::new(self.block()?);
        Ok(Statement::While { condition, body, position })
    }

    fn for_statement(&mut self) -> Parse<Statement> {
        let position = self.expect(TokenKind::Fuer, "FUER")?.position;
        self.expect(TokenKind::LParen, "'(' after FUER")?;

        let initializer = if self.check(TokenKind::Semicolon) {
            self.advance();
            None
        } else if Self::is_type_keyword(self.peek().kind) {
            Some(Box::new(self.variable_declaration()?))
        } else {
            Some(Box::new(self.assignment()?))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(TokenKind::Semicolon, "';' after loop condition")?;

        let increment = if self.check(TokenKind::RParen) {
            None
        } else {
            let inc_position = self.peek().position;
            let name = self.expect(TokenKind::Identifier, "loop increment variable")?.lexeme;
            self.expect(TokenKind::Assign, "'=' in loop increment")?;
            let value = self.expression()?;
            Some(Box::new(Statement::Assignment {
                name,
                value,
                position: inc_position,
            }))
        };
        self.expect(TokenKind::RParen, "')' after FUER clauses")?;

        let body = Box::new(self.block()?);

        Ok(Statement::For {
            initializer,
            condition,
            increment,
            body,
            position,
        })
    }

    fn variable_declaration(&mut self) -> Parse<Statement> {
        let position = self.peek().position;
        let type_name = self.type_name()?;
        let name = self.expect(TokenKind::Identifier, "variable name")?.lexeme;
        self.expect(TokenKind::Assign, "'=' in variable declaration")?;
        let initializer = self.expression()?;
        self.expect(TokenKind::Semicolon, "';' after variable declaration")?;
        Ok(Statement::VariableDeclaration {
            type_name,
            name,
            initializer,
            position,
        })
    }

    fn assignment(&mut self) -> Parse<Statement> {
        let position = self.peek().position;
        let name = self.expect(TokenKind::Identifier, "variable name")?.lexeme;
        self.expect(TokenKind::Assign, "'=' in assignment")?;
        let value = self.expression()?;
        self.expect(TokenKind::Semicolon, "';' after assignment")?;
        Ok(Statement::Assignment { name, value, position })
    }

    fn array_assignment(&mut self) -> Parse<Statement> {
        let position = self.peek().position;
        let name = self.expect(TokenKind::Identifier, "array name")?.lexeme;
        self.expect(TokenKind::LBracket, "'[' after array name")?;
        let index = self.expression()?;
        self.expect(TokenKind::RBracket, "']' after array index")?;
        self.expect(TokenKind::Assign, "'=' in array assignment")?;
        let value = self.expression()?;
        self.expect(TokenKind::Semicolon, "';' after array assignment")?;
        Ok(Statement::ArrayAssignment {
            name,
            index,
            value,
            position,
        })
    }

    // ---- expressions -------------------------------------------------

    fn expression(&mut self) -> Parse<Expression> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> Parse<Expression> {
        self.binary_left(Self::logical_and, &[TokenKind::Oder])
    }

    fn logical_and(&mut self) -> Parse<Expression> {
        self.binary_left(Self::equality, &[TokenKind::Und])
    }

    fn equality(&mut self) -> Parse<Expression> {
        self.binary_left(Self::comparison, &[TokenKind::Eq, TokenKind::Neq])
    }

    fn comparison(&mut self) -> Parse<Expression> {
        self.binary_left(
            Self::term,
            &[TokenKind::Lt, TokenKind::Lte, TokenKind::Gt, TokenKind::Gte],
        )
    }

    fn term(&mut self) -> Parse<Expression> {
        self.binary_left(Self::factor, &[TokenKind::Plus, TokenKind::Minus])
    }

    fn factor(&mut self) -> Parse<Expression> {
        self.binary_left(
            Self::unary,
            &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
        )
    }

    fn binary_left(
        &mut self,
        operand: fn(&mut Self) -> Parse<Expression>,
        operators: &[TokenKind],
    ) -> Parse<Expression> {
        let mut left = operand(self)?;

        while operators.contains(&self.peek().kind) {
            let op_token = self.advance();
            let right = operand(self)?;
            let position = left.position();
            left = Expression::Binary {
                left: Box::new(left),
                op: op_token.lexeme,
                right: Box::new(right),
                position,
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Parse<Expression> {
        if matches!(
            self.peek().kind,
            TokenKind::Minus | TokenKind::Not | TokenKind::Nicht
        ) {
            let op_token = self.advance();
            let operand = self.unary()?;
            Ok(Expression::Unary {
                op: op_token.lexeme,
                operand: Box::new(operand),
                position: op_token.position,
            })
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> Parse<Expression> {
        let mut expr = self.primary()?;

        loop {
            if self.check(TokenKind::LParen) {
                let position = expr.position();
                self.advance();
                let args = if self.check(TokenKind::RParen) {
                    Vec::new()
                } else {
                    self.arguments()?
                };
                self.expect(TokenKind::RParen, "')' after call arguments")?;

                let callee = match expr {
                    Expression::Identifier { name, .. } => name,
                    _ => {
                        return Err(self.fail_strict(ParserError::UnexpectedToken {
                            expected: "an identifier before '('".to_string(),
                            found: "an expression".to_string(),
                        }))
                    }
                };
                expr = Expression::Call { callee, args, position };
            } else if self.check(TokenKind::LBracket) {
                let position = expr.position();
                self.advance();
                let index = self.expression()?;
                self.expect(TokenKind::RBracket, "']' after array index")?;
                expr = Expression::ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                    position,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn arguments(&mut self) -> Parse<Vec<Expression>> {
        let mut args = vec![self.expression()?];
        while self.check(TokenKind::Comma) {
            self.advance();
            args.push(self.expression()?);
        }
        Ok(args)
    }

    fn primary(&mut self) -> Parse<Expression> {
        let position = self.peek().position;

        match self.peek().kind {
            TokenKind::IntLiteral => {
                let lexeme = self.advance().lexeme;
                let value = lexeme.parse::<i32>().unwrap_or(0);
                Ok(Expression::Literal {
                    value: LiteralValue::Ganz(value),
                    position,
                })
            }
            TokenKind::FloatLiteral => {
                let lexeme = self.advance().lexeme;
                let value = lexeme.parse::<f32>().unwrap_or(0.0);
                Ok(Expression::Literal {
                    value: LiteralValue::Komma(value),
                    position,
                })
            }
            TokenKind::StringLiteral => {
                let lexeme = self.advance().lexeme;
                Ok(Expression::Literal {
                    value: LiteralValue::Wort(lexeme),
                    position,
                })
            }
            TokenKind::BoolLiteral => {
                let lexeme = self.advance().lexeme;
                Ok(Expression::Literal {
                    value: LiteralValue::Jain(lexeme == "JA"),
                    position,
                })
            }
            TokenKind::LBracket => self.array_literal(),
            TokenKind::Identifier => {
                let name = self.advance().lexeme;
                Ok(Expression::Identifier { name, position })
            }
            TokenKind::Lese => {
                self.advance();
                self.expect(TokenKind::LParen, "'(' after LESE")?;
                self.expect(TokenKind::RParen, "')' after LESE(")?;
                Ok(Expression::Read { position })
            }
            TokenKind::ZuGanz | TokenKind::ZuKomma | TokenKind::ZuWort => {
                let kind = self.advance().kind;
                let target_type = match kind {
                    TokenKind::ZuGanz => TypeTag::Ganz,
                    TokenKind::ZuKomma => TypeTag::Komma,
                    _ => TypeTag::Wort,
                };
                self.expect(TokenKind::LParen, "'(' after type-conversion intrinsic")?;
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "')' after conversion argument")?;
                Ok(Expression::TypeConversion {
                    target_type,
                    expr: Box::new(expr),
                    position,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.expect(TokenKind::RParen, "')' after parenthesized expression")?;
                Ok(expr)
            }
            TokenKind::Unknown if self.peek().lexeme == "unterminated string literal" => {
                Err(self.fail_strict(ParserError::UnterminatedString))
            }
            _ => {
                let found = self.peek().to_string();
                Err(self.fail_strict(ParserError::UnexpectedToken {
                    expected: "an expression".to_string(),
                    found,
                }))
            }
        }
    }

    fn array_literal(&mut self) -> Parse<Expression> {
        let position = self.expect(TokenKind::LBracket, "'['")?.position;
        let elements = if self.check(TokenKind::RBracket) {
            Vec::new()
        } else {
            self.arguments()?
        };
        self.expect(TokenKind::RBracket, "']' after array literal")?;
        Ok(Expression::ArrayLiteral { elements, position })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_ok(source: &str) -> Program {
        let tokens = tokenize(source);
        match parse(tokens, "test.gl", source) {
            Ok(outcome) => {
                assert!(outcome.diagnostics.is_empty(), "unexpected diagnostics");
                outcome.program
            }
            Err(diagnostics) => panic!("expected a successful parse, got: {}", diagnostics),
        }
    }

    #[test]
    fn parses_hello_world_function() {
        let program = parse_ok(r#"GANZ haupt() { DRUCKE("Hallo"); ZURUECK 0; }"#);
        assert_eq!(program.declarations().count(), 1);
        match program.declarations().next().unwrap() {
            Statement::FunctionDeclaration { name, parameters, .. } => {
                assert_eq!(name, "haupt");
                assert!(parameters.is_empty());
            }
            other => panic!("expected a function declaration, got {:?}", other),
        }
    }

    #[test]
    fn left_associative_arithmetic_builds_nested_binary() {
        let program = parse_ok("GANZ haupt() { ZURUECK 1 + 2 * 3; }");
        let Statement::FunctionDeclaration { body, .. } = program.declarations().next().unwrap() else {
            panic!("expected function");
        };
        let Statement::Block { statements, .. } = body.as_ref() else {
            panic!("expected block");
        };
        match &statements[0] {
            Statement::Return { value, .. } => match value {
                Expression::Binary { op, right, .. } => {
                    assert_eq!(op, "+");
                    assert!(matches!(**right, Expression::Binary { .. }));
                }
                other => panic!("expected binary expression, got {:?}", other),
            },
            other => panic!("expected return statement, got {:?}", other),
        }
    }

    #[test]
    fn else_if_chain_nests_as_if_inside_else() {
        let program = parse_ok(
            "GANZ haupt() { WENN (n < 0) { DRUCKE(1); } SONST WENN (n == 0) { DRUCKE(2); } SONST { DRUCKE(3); } }",
        );
        let Statement::FunctionDeclaration { body, .. } = program.declarations().next().unwrap() else {
            panic!("expected function");
        };
        let Statement::Block { statements, .. } = body.as_ref() else {
            panic!("expected block");
        };
        match &statements[0] {
            Statement::If { else_branch, .. } => {
                let else_branch = else_branch.as_ref().expect("expected else branch");
                assert!(matches!(**else_branch, Statement::If { .. }));
            }
            other => panic!("expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn rejects_top_level_variable_declaration_but_recovers() {
        let tokens = tokenize("GANZ x = 1; GANZ haupt() { ZURUECK 0; }");
        let outcome = parse(tokens, "test.gl", "").expect("should recover, not abort");
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.program.declarations().count(), 1);
    }

    #[test]
    fn missing_semicolon_is_a_hard_parse_error() {
        let tokens = tokenize("GANZ haupt() { GANZ x = 1 ZURUECK 0; }");
        let result = parse(tokens, "test.gl", "GANZ haupt() { GANZ x = 1 ZURUECK 0; }");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_top_level_token_is_recorded_and_next_declaration_still_parses() {
        let tokens = tokenize("@@@ GANZ haupt() { ZURUECK 0; }");
        let outcome = parse(tokens, "test.gl", "").expect("should recover");
        assert_eq!(outcome.program.declarations().count(), 1);
        assert!(!outcome.diagnostics.is_empty());
    }

    #[test]
    fn for_loop_with_array_access_parses() {
        let program = parse_ok(
            "GANZ haupt() { GANZ[] xs = [10, 20, 30]; FUER (GANZ i = 0; i < 3; i = i + 1) { DRUCKE(xs[i]); } ZURUECK 0; }",
        );
        assert_eq!(program.declarations().count(), 1);
    }
}
