//! Code generation: a single pass over the AST that appends C++17 source
//! text to an internal buffer.
//!
//! The generator never fails. Its closed input — a [`Program`] built by
//! [`crate::parser`] — only ever contains the node shapes in
//! [`crate::ast`], and the `match` expressions below are exhaustive, so
//! there is no "unknown node kind" arm left to report a diagnostic for.

use crate::ast::{Expression, LiteralValue, Parameter, Program, Statement, TypeName, TypeTag};

const PRELUDE: &str = r#"#include <iostream>
#include <string>
#include <vector>

std::string gerlang_lese() {
    std::string line;
    std::getline(std::cin, line);
    return line;
}

int gerlang_zu_ganz(const std::string& s) {
    try {
        return std::stoi(s);
    } catch (...) {
        return 0;
    }
}

float gerlang_zu_komma(const std::string& s) {
    try {
        return std::stof(s);
    } catch (...) {
        return 0.0f;
    }
}

template <typename T>
std::string gerlang_zu_wort(const T& value) {
    return std::to_string(value);
}

"#;

/// Translates a parsed program into a complete C++17 translation unit.
pub fn generate(program: &Program) -> String {
    let mut out = String::from(PRELUDE);

    for declaration in program.declarations() {
        emit_statement(&mut out, declaration, 0);
        out.push('\n');
    }

    out
}

fn indent(out: &mut String, depth: usize) {
    out.push_str(&"    ".repeat(depth));
}

fn cpp_type(type_name: &TypeName) -> String {
    match type_name {
        TypeName::Ganz => "int".to_string(),
        TypeName::Komma => "float".to_string(),
        TypeName::Wort => "std::string".to_string(),
        TypeName::Jain => "bool".to_string(),
        TypeName::Kiste => "std::vector<int>".to_string(),
        TypeName::Array(base) => match base.as_ref() {
            TypeName::Ganz | TypeName::Kiste => "std::vector<int>".to_string(),
            TypeName::Komma => "std::vector<float>".to_string(),
            TypeName::Wort => "std::vector<std::string>".to_string(),
            TypeName::Jain => "std::vector<bool>".to_string(),
            TypeName::Array(_) => "void".to_string(),
        },
    }
}

fn cpp_function_name(name: &str) -> &str {
    if name == "haupt" {
        "main"
    } else {
        name
    }
}

fn cpp_operator(op: &str) -> &str {
    match op {
        "UND" => "&&",
        "ODER" => "||",
        "NICHT" => "!",
        other => other,
    }
}

fn escape_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn emit_expression(out: &mut String, expr: &Expression) {
    match expr {
        Expression::Literal { value, .. } => emit_literal(out, value),
        Expression::Identifier { name, .. } => out.push_str(name),
        Expression::Binary { left, op, right, .. } => {
            out.push('(');
            emit_expression(out, left);
            out.push(' ');
            out.push_str(cpp_operator(op));
            out.push(' ');
            emit_expression(out, right);
            out.push(')');
        }
        Expression::Unary { op, operand, .. } => {
            out.push('(');
            out.push_str(cpp_operator(op));
            emit_expression(out, operand);
            out.push(')');
        }
        Expression::Call { callee, args, .. } => {
            out.push_str(cpp_function_name(callee));
            out.push('(');
            emit_comma_separated(out, args, emit_expression);
            out.push(')');
        }
        Expression::ArrayLiteral { elements, .. } => {
            out.push('{');
            emit_comma_separated(out, elements, emit_expression);
            out.push('}');
        }
        Expression::ArrayAccess { array, index, .. } => {
            emit_expression(out, array);
            out.push('[');
            emit_expression(out, index);
            out.push(']');
        }
        Expression::Read { .. } => out.push_str("gerlang_lese()"),
        Expression::TypeConversion { target_type, expr, .. } => {
            out.push_str(conversion_function(*target_type));
            out.push('(');
            emit_expression(out, expr);
            out.push(')');
        }
    }
}

fn emit_comma_separated<T>(out: &mut String, items: &[T], emit_one: fn(&mut String, &T)) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        emit_one(out, item);
    }
}

fn conversion_function(target_type: TypeTag) -> &'static str {
    match target_type {
        TypeTag::Ganz => "gerlang_zu_ganz",
        TypeTag::Komma => "gerlang_zu_komma",
        TypeTag::Wort => "gerlang_zu_wort",
        TypeTag::Jain => "gerlang_zu_ganz",
    }
}

fn emit_literal(out: &mut String, value: &LiteralValue) {
    match value {
        LiteralValue::Ganz(n) => out.push_str(&n.to_string()),
        LiteralValue::Komma(n) => out.push_str(&cpp_float_literal(*n)),
        LiteralValue::Wort(s) => {
            out.push('"');
            out.push_str(&escape_string(s));
            out.push('"');
        }
        LiteralValue::Jain(b) => out.push_str(if *b { "true" } else { "false" }),
    }
}

/// Formats a float literal for C++, guaranteeing a decimal point before
/// the `f` suffix. `f32`'s `Display` drops the point for whole values
/// (`3.0` prints as `"3"`), which would otherwise emit `3f` — not a
/// valid C++ floating-point literal.
fn cpp_float_literal(value: f32) -> String {
    let text = value.to_string();
    if text.contains('.') || text.contains('e') || text.contains('E') {
        format!("{text}f")
    } else {
        format!("{text}.0f")
    }
}

fn emit_parameters(out: &mut String, parameters: &[Parameter]) {
    for (i, parameter) in parameters.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&cpp_type(&parameter.type_name));
        out.push(' ');
        out.push_str(&parameter.name);
    }
}

fn emit_statement(out: &mut String, statement: &Statement, depth: usize) {
    match statement {
        Statement::VariableDeclaration {
            type_name,
            name,
            initializer,
            ..
        } => {
            indent(out, depth);
            out.push_str(&cpp_type(type_name));
            out.push(' ');
            out.push_str(name);
            out.push_str(" = ");
            emit_expression(out, initializer);
            out.push_str(";\n");
        }
        Statement::Assignment { name, value, .. } => {
            indent(out, depth);
            out.push_str(name);
            out.push_str(" = ");
            emit_expression(out, value);
            out.push_str(";\n");
        }
        Statement::ArrayAssignment { name, index, value, .. } => {
            indent(out, depth);
            out.push_str(name);
            out.push('[');
            emit_expression(out, index);
            out.push_str("] = ");
            emit_expression(out, value);
            out.push_str(";\n");
        }
        Statement::Block { statements, .. } => {
            out.push_str("{\n");
            for statement in statements {
                emit_statement(out, statement, depth + 1);
            }
            indent(out, depth);
            out.push_str("}\n");
        }
        Statement::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            indent(out, depth);
            out.push_str("if (");
            emit_expression(out, condition);
            out.push_str(") ");
            emit_block_inline(out, then_branch, depth);
            if let Some(else_branch) = else_branch {
                indent(out, depth);
                out.push_str("else ");
                match else_branch.as_ref() {
                    Statement::If { .. } => {
                        // re-emit without the leading indent the nested
                        // call would otherwise add after "else "
                        let mut nested = String::new();
                        emit_statement(&mut nested, else_branch, depth);
                        out.push_str(nested.trim_start());
                    }
                    _ => emit_block_inline(out, else_branch, depth),
                }
            }
        }
        Statement::While { condition, body, .. } => {
            indent(out, depth);
            out.push_str("while (");
            emit_expression(out, condition);
            out.push_str(") ");
            emit_block_inline(out, body, depth);
        }
        Statement::For {
            initializer,
            condition,
            increment,
            body,
            ..
        } => {
            indent(out, depth);
            out.push_str("for (");
            if let Some(initializer) = initializer {
                emit_for_clause(out, initializer);
            }
            out.push_str("; ");
            if let Some(condition) = condition {
                emit_expression(out, condition);
            }
            out.push_str("; ");
            if let Some(increment) = increment {
                emit_for_clause(out, increment);
            }
            out.push_str(") ");
            emit_block_inline(out, body, depth);
        }
        Statement::Return { value, .. } => {
            indent(out, depth);
            out.push_str("return ");
            emit_expression(out, value);
            out.push_str(";\n");
        }
        Statement::Print { expression, .. } => {
            indent(out, depth);
            out.push_str("std::cout << ");
            emit_expression(out, expression);
            out.push_str(" << std::endl;\n");
        }
        Statement::FunctionDeclaration {
            return_type,
            name,
            parameters,
            body,
            ..
        } => {
            indent(out, depth);
            out.push_str(&cpp_type(return_type));
            out.push(' ');
            out.push_str(cpp_function_name(name));
            out.push('(');
            emit_parameters(out, parameters);
            out.push_str(") ");
            emit_block_inline(out, body, depth);
        }
    }
}

/// Emits a `Block` statement without its own leading indentation, so it
/// can be appended right after `if (...) `, `while (...) `, a function
/// signature, and similar constructs.
fn emit_block_inline(out: &mut String, statement: &Statement, depth: usize) {
    match statement {
        Statement::Block { .. } => emit_statement(out, statement, depth),
        other => emit_statement(out, other, depth),
    }
}

/// The for-loop initializer/increment clauses are restricted to a
/// declaration or a plain assignment; both are emitted without their
/// trailing `;\n` or indentation, since the surrounding `for (...)` owns
/// the punctuation.
fn emit_for_clause(out: &mut String, statement: &Statement) {
    match statement {
        Statement::VariableDeclaration {
            type_name,
            name,
            initializer,
            ..
        } => {
            out.push_str(&cpp_type(type_name));
            out.push(' ');
            out.push_str(name);
            out.push_str(" = ");
            emit_expression(out, initializer);
        }
        Statement::Assignment { name, value, .. } => {
            out.push_str(name);
            out.push_str(" = ");
            emit_expression(out, value);
        }
        other => unreachable!("for-loop clauses are restricted to decl/assignment, got {:?}", other),
    }
}
