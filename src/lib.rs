//! `gerlangc`: a source-to-source compiler from GerLang (GL), a small
//! imperative language with German keywords, to C++17.
//!
//! The pipeline is a strict three-stage pull chain:
//!
//! ```text
//! source text -> lexer -> token stream -> parser -> AST -> generator -> C++ text
//! ```
//!
//! [`driver`] ties the three stages together and, optionally, hands the
//! generated C++ to a host compiler to produce a native executable.

pub mod ast;
pub mod driver;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod source;
