//! Error types for query parsing.
//!
//! Parsing reports the first failure only, with the kind of failure, the
//! byte offset it occurred at, and the original query for context.

use std::{error, fmt};

use thiserror::Error;

/// The specific way a query failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The grammar did not accept the input at this position.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the parser was looking for.
        expected: String,
        /// What it found instead.
        found: String,
    },

    /// A `"` or `/` literal was opened but never closed.
    #[error("unterminated literal, no closing '{delimiter}'")]
    UnterminatedLiteral {
        /// The delimiter that is missing.
        delimiter: char,
    },

    /// A numeric suffix was missing or malformed.
    #[error("invalid number after '{operator}': {found}")]
    InvalidNumber {
        /// The suffix operator the number belongs to.
        operator: char,
        /// The offending text.
        found: String,
    },

    /// A reserved operator keyword appeared in field-name position.
    #[error("reserved word '{name}' cannot be used as a field name")]
    ReservedFieldName {
        /// The rejected name.
        name: String,
    },

    /// The input ended right after a binary operator.
    #[error("dangling operator '{operator}' at end of query")]
    TrailingOperator {
        /// The operator with a missing right-hand side.
        operator: String,
    },

    /// Input remained after the grammar finished.
    #[error("unexpected input after end of query")]
    TrailingInput,

    /// Nesting went past the configured limit.
    #[error("nesting depth exceeds the limit of {limit}")]
    DepthExceeded {
        /// The limit in force.
        limit: usize,
    },
}

/// A parse failure with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of failure.
    pub kind: ParseErrorKind,
    /// Byte position in the input where the error occurred.
    pub position: usize,
    /// The original query string.
    pub query: String,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, position: usize, query: &str) -> Self {
        Self {
            kind,
            position,
            query: query.to_string(),
        }
    }

    /// Formats the error with a position indicator showing where the error occurred.
    pub fn format_with_context(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("query syntax error: {}\n", self.kind));
        result.push_str(&format!("  {}\n", self.query));
        result.push_str(&format!(
            "  {}^",
            " ".repeat(self.position.min(self.query.len()))
        ));
        result
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_context())
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_caret_at_position() {
        let err = ParseError::new(
            ParseErrorKind::UnterminatedLiteral { delimiter: '"' },
            4,
            "cat \"dog",
        );
        let display = err.to_string();
        assert!(display.contains("unterminated literal"));
        assert!(display.contains("cat \"dog"));
        assert!(display.ends_with("    ^"));
    }

    #[test]
    fn caret_is_clamped_to_input_length() {
        let err = ParseError::new(ParseErrorKind::TrailingInput, 99, "abc");
        let display = err.to_string();
        assert!(display.ends_with("   ^"));
    }

    #[test]
    fn kind_is_exposed_as_source() {
        use std::error::Error;

        let err = ParseError::new(
            ParseErrorKind::DepthExceeded { limit: 16 },
            0,
            "((((((((((((((((((",
        );
        let source = err.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("nesting depth exceeds the limit of 16"));
    }
}
