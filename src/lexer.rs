//! Lexical analysis.
//!
//! This is the first phase of the compiler. It breaks source text into
//! tokens, discarding whitespace and comments along the way. Every token
//! carries the position of its first character, so that later phases can
//! trace errors back to a precise spot in the original file.
//!
//! # Failure mode
//! The lexer never aborts. An unrecognized character becomes a token of
//! kind [`TokenKind::Unknown`] carrying that character as its lexeme; an
//! unterminated string literal becomes an `Unknown` token carrying a
//! diagnostic message as its lexeme. It is up to the parser to turn an
//! `Unknown` token into a reported syntax error.

use crate::source::Position;
use std::fmt::{self, Display};

/// The closed set of lexical categories GerLang recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Type keywords
    Ganz,
    Komma,
    Wort,
    Jain,
    Kiste,

    // Control keywords
    Wenn,
    Sonst,
    Solange,
    Fuer,
    Zurueck,

    // Logical keywords
    Und,
    Oder,
    Nicht,

    // I/O keywords
    Drucke,
    Lese,

    // Conversion keywords
    ZuGanz,
    ZuKomma,
    ZuWort,

    // Reserved, but unused by the grammar
    Gibfrei,
    Hole,
    Von,

    // Literals
    IntLiteral,
    FloatLiteral,
    StringLiteral,
    BoolLiteral,

    Identifier,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Not,
    Lt,
    Gt,
    Eq,
    Neq,
    Lte,
    Gte,

    // Sentinels
    Eof,
    Unknown,
}

impl Display for TokenKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;

        let text = match self {
            Ganz => "GANZ",
            Komma => "KOMMA",
            Wort => "WORT",
            Jain => "JAIN",
            Kiste => "KISTE",
            Wenn => "WENN",
            Sonst => "SONST",
            Solange => "SOLANGE",
            Fuer => "FUER",
            Zurueck => "ZURUECK",
            Und => "UND",
            Oder => "ODER",
            Nicht => "NICHT",
            Drucke => "DRUCKE",
            Lese => "LESE",
            ZuGanz => "ZU_GANZ",
            ZuKomma => "ZU_KOMMA",
            ZuWort => "ZU_WORT",
            Gibfrei => "GIBFREI",
            Hole => "HOLE",
            Von => "VON",
            IntLiteral => "integer literal",
            FloatLiteral => "float literal",
            StringLiteral => "string literal",
            BoolLiteral => "boolean literal",
            Identifier => "identifier",
            LParen => "'('",
            RParen => "')'",
            LBrace => "'{'",
            RBrace => "'}'",
            LBracket => "'['",
            RBracket => "']'",
            Semicolon => "';'",
            Comma => "','",
            Dot => "'.'",
            Colon => "':'",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            Assign => "'='",
            Not => "'!'",
            Lt => "'<'",
            Gt => "'>'",
            Eq => "'=='",
            Neq => "'!='",
            Lte => "'<='",
            Gte => "'>='",
            Eof => "end of file",
            Unknown => "unrecognized token",
        };

        fmt.write_str(text)
    }
}

/// A single lexical unit, with its verbatim lexeme and source position.
///
/// Lexemes are stored verbatim (rather than, say, pre-parsed numeric
/// values) so that the parser can recover literal values and identifier
/// spellings without re-scanning the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{} '{}'", self.kind, self.lexeme)
    }
}

fn keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;

    Some(match word {
        "GANZ" => Ganz,
        "KOMMA" => Komma,
        "WORT" => Wort,
        "JAIN" => Jain,
        "KISTE" => Kiste,
        "WENN" => Wenn,
        "SONST" => Sonst,
        "SOLANGE" => Solange,
        "FUER" => Fuer,
        "ZURUECK" => Zurueck,
        "UND" => Und,
        "ODER" => Oder,
        "NICHT" => Nicht,
        "DRUCKE" => Drucke,
        "LESE" => Lese,
        "ZU_GANZ" => ZuGanz,
        "ZU_KOMMA" => ZuKomma,
        "ZU_WORT" => ZuWort,
        "GIBFREI" => Gibfrei,
        "HOLE" => Hole,
        "VON" => Von,
        _ => return None,
    })
}

/// Scans a complete source string into tokens.
///
/// The lexer is total: for any input, this terminates and returns a
/// sequence whose last element has kind [`TokenKind::Eof`].
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    position: Position,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            position: Position::start(),
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars.get(self.pos).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.pos + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.is_at_end() {
            self.pos += 1;
            self.position = self.position.advance(c);
        }
        c
    }

    fn skip_trivia(&mut self) {
        loop {
            if self.peek().is_ascii_whitespace() {
                self.advance();
            } else if self.peek() == '/' && self.peek_next() == '/' {
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
            } else if self.peek() == '/' && self.peek_next() == '*' {
                self.advance();
                self.advance();
                while !self.is_at_end() && !(self.peek() == '*' && self.peek_next() == '/') {
                    self.advance();
                }
                if !self.is_at_end() {
                    self.advance();
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self) -> Token {
        let start = self.position;
        let mut lexeme = String::new();
        let mut seen_dot = false;

        while !self.is_at_end() && (self.peek().is_ascii_digit() || self.peek() == '.') {
            if self.peek() == '.' {
                if seen_dot {
                    break;
                }
                seen_dot = true;
            }
            lexeme.push(self.advance());
        }

        let kind = if seen_dot {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        };
        Token::new(kind, lexeme, start)
    }

    fn scan_string(&mut self) -> Token {
        let start = self.position;
        let quote = self.advance();

        let mut lexeme = String::new();
        while !self.is_at_end() && self.peek() != quote {
            lexeme.push(self.advance());
        }

        if self.is_at_end() {
            return Token::new(
                TokenKind::Unknown,
                "unterminated string literal",
                start,
            );
        }

        self.advance(); // closing quote
        Token::new(TokenKind::StringLiteral, lexeme, start)
    }

    fn scan_word(&mut self) -> Token {
        let start = self.position;
        let mut lexeme = String::new();

        while !self.is_at_end()
            && (self.peek().is_ascii_alphanumeric() || self.peek() == '_')
        {
            lexeme.push(self.advance());
        }

        if lexeme == "JA" || lexeme == "NEIN" {
            return Token::new(TokenKind::BoolLiteral, lexeme, start);
        }
        if let Some(kind) = keyword(&lexeme) {
            return Token::new(kind, lexeme, start);
        }
        Token::new(TokenKind::Identifier, lexeme, start)
    }

    fn scan_operator_or_punct(&mut self) -> Token {
        use TokenKind::*;

        let start = self.position;
        let c = self.advance();

        // Two-character operators are checked before single-character ones.
        let two_char = match (c, self.peek()) {
            ('=', '=') => Some((Eq, "==")),
            ('!', '=') => Some((Neq, "!=")),
            ('<', '=') => Some((Lte, "<=")),
            ('>', '=') => Some((Gte, ">=")),
            _ => None,
        };
        if let Some((kind, lexeme)) = two_char {
            self.advance();
            return Token::new(kind, lexeme, start);
        }

        let kind = match c {
            '(' => LParen,
            ')' => RParen,
            '{' => LBrace,
            '}' => RBrace,
            '[' => LBracket,
            ']' => RBracket,
            ';' => Semicolon,
            ',' => Comma,
            '.' => Dot,
            ':' => Colon,
            '+' => Plus,
            '-' => Minus,
            '*' => Star,
            '/' => Slash,
            '%' => Percent,
            '=' => Assign,
            '<' => Lt,
            '>' => Gt,
            '!' => Not,
            _ => Unknown,
        };

        Token::new(kind, c.to_string(), start)
    }

    /// Scans and returns the next token, skipping any leading whitespace
    /// or comments.
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();

        if self.is_at_end() {
            return Token::new(TokenKind::Eof, "", self.position);
        }

        let c = self.peek();
        if c.is_ascii_digit() {
            self.scan_number()
        } else if c == '"' || c == '\'' {
            self.scan_string()
        } else if c.is_alphabetic() || c == '_' {
            self.scan_word()
        } else {
            self.scan_operator_or_punct()
        }
    }
}

/// Scans `source` to completion, returning every token including the
/// trailing [`TokenKind::Eof`] sentinel.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token();
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push(token);
        if is_eof {
            break;
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_hello_world_function() {
        let tokens = tokenize(r#"GANZ haupt() { DRUCKE("Hallo"); ZURUECK 0; }"#);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                Ganz, Identifier, LParen, RParen, LBrace, Drucke, LParen, StringLiteral,
                RParen, Semicolon, Zurueck, IntLiteral, Semicolon, RBrace, Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_int_and_float_literals() {
        let tokens = tokenize("1 2.5 3.");
        assert_eq!(tokens[0].kind, IntLiteral);
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(tokens[1].kind, FloatLiteral);
        assert_eq!(tokens[1].lexeme, "2.5");
        assert_eq!(tokens[2].kind, FloatLiteral);
        assert_eq!(tokens[2].lexeme, "3.");
    }

    #[test]
    fn second_dot_terminates_the_number() {
        let tokens = tokenize("1.2.3");
        assert_eq!(tokens[0].kind, FloatLiteral);
        assert_eq!(tokens[0].lexeme, "1.2");
        assert_eq!(tokens[1].kind, Dot);
        assert_eq!(tokens[2].kind, IntLiteral);
        assert_eq!(tokens[2].lexeme, "3");
    }

    #[test]
    fn recognizes_bool_literals() {
        assert_eq!(kinds("JA NEIN"), vec![BoolLiteral, BoolLiteral, Eof]);
    }

    #[test]
    fn recognizes_two_char_operators_before_single_char() {
        assert_eq!(
            kinds("== != <= >= < > ="),
            vec![Eq, Neq, Lte, Gte, Lt, Gt, Assign, Eof]
        );
    }

    #[test]
    fn identifier_may_start_with_underscore() {
        assert_eq!(kinds("_foo foo_2"), vec![Identifier, Identifier, Eof]);
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            kinds("GANZ // line comment\n/* block\ncomment */ KOMMA"),
            vec![Ganz, Komma, Eof]
        );
    }

    #[test]
    fn unterminated_string_becomes_unknown_token() {
        let tokens = tokenize("\"abc");
        assert_eq!(tokens[0].kind, Unknown);
        assert_eq!(tokens[0].lexeme, "unterminated string literal");
    }

    #[test]
    fn string_literal_accepts_either_quote_character() {
        let tokens = tokenize("'abc' \"def\"");
        assert_eq!(tokens[0].kind, StringLiteral);
        assert_eq!(tokens[0].lexeme, "abc");
        assert_eq!(tokens[1].kind, StringLiteral);
        assert_eq!(tokens[1].lexeme, "def");
    }

    #[test]
    fn unrecognized_character_becomes_unknown_token() {
        let tokens = tokenize("@");
        assert_eq!(tokens[0].kind, Unknown);
        assert_eq!(tokens[0].lexeme, "@");
    }

    #[test]
    fn position_is_monotonic() {
        let tokens = tokenize("GANZ haupt\n  = 1;");
        for pair in tokens.windows(2) {
            let (a, b) = (pair[0].position, pair[1].position);
            assert!((a.line(), a.column()) <= (b.line(), b.column()));
        }
    }

    #[test]
    fn reserved_keywords_are_recognized_but_unused_by_grammar() {
        assert_eq!(kinds("GIBFREI HOLE VON"), vec![Gibfrei, Hole, Von, Eof]);
    }
}
