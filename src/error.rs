//! Parser errors and diagnostic rendering.
//!
//! The lexer never raises an error (see [`crate::lexer`]); everything
//! that reaches here originates from the parser, either as a single
//! hard abort (an error inside an expression or block) or as a batch of
//! recovered top-level errors (declarations the parser skipped one
//! token past and kept going).

use std::error::Error;
use std::fmt::{self, Display};

use thiserror::Error as ThisError;

use crate::source::{Located, Position};

/// Everything that can go wrong while parsing a token sequence.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("unexpected end of file, expected {0}")]
    UnexpectedEof(String),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("'{0}' is not a valid top-level declaration")]
    InvalidTopLevelDeclaration(String),
}

pub type LocatedParserError = Located<ParserError>;

/// One or more positioned parser errors, ready to be rendered for a
/// human reader.
///
/// Carries the offending file's name and full text so each error can be
/// rendered with its originating source line, `rustc`-style.
#[derive(Debug)]
pub struct Diagnostics {
    file_name: String,
    source: String,
    errors: Vec<LocatedParserError>,
}

impl Diagnostics {
    pub fn new(file_name: impl Into<String>, source: impl Into<String>) -> Self {
        Diagnostics {
            file_name: file_name.into(),
            source: source.into(),
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, error: LocatedParserError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[LocatedParserError] {
        &self.errors
    }

    fn source_line(&self, position: Position) -> Option<&str> {
        self.source.lines().nth(position.line() as usize - 1)
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return writeln!(fmt, "no errors were reported");
        }

        for error in &self.errors {
            let position = error.position();
            writeln!(fmt, "error: {}", error.val())?;
            writeln!(
                fmt,
                " --> {}:{}:{}",
                self.file_name,
                position.line(),
                position.column()
            )?;

            let digits = position.line().to_string().chars().count();
            writeln!(fmt, "{:digits$} |", "", digits = digits)?;

            if let Some(line) = self.source_line(position) {
                writeln!(fmt, "{:>digits$} | {}", position.line(), line, digits = digits)?;
            }

            let skip = position.column().saturating_sub(1) as usize;
            writeln!(fmt, "{:digits$} | {:skip$}^", "", "", digits = digits, skip = skip)?;
            writeln!(fmt)?;
        }

        let error_or_errors = if self.errors.len() == 1 {
            "error"
        } else {
            "errors"
        };
        write!(fmt, "could not parse: {} {}", self.errors.len(), error_or_errors)
    }
}

impl Error for Diagnostics {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_file_name_line_and_caret() {
        let mut diagnostics = Diagnostics::new("foo.gl", "GANZ x = ;\n");
        diagnostics.push(Located::at(
            ParserError::UnexpectedEof("expression".to_string()),
            Position::start().advance('G').advance('A'),
        ));

        let rendered = diagnostics.to_string();
        assert!(rendered.contains("foo.gl:1:3"));
        assert!(rendered.contains("GANZ x = ;"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn empty_diagnostics_report_no_errors() {
        let diagnostics = Diagnostics::new("foo.gl", "");
        assert!(diagnostics.is_empty());
        assert_eq!(diagnostics.to_string(), "no errors were reported\n");
    }
}
