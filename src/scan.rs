//! Lexical primitives for the query grammar.
//!
//! The scanner walks the raw input one character at a time and exposes
//! the low-level reads the parser is built from: whitespace skipping,
//! identifier and digit runs, and checkpoint/restore for lookahead.

use crate::error::{ParseError, ParseErrorKind};

/// Returns true if `ch` can start an identifier.
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

/// Returns true if `ch` can continue an identifier.
pub fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Returns true if `word` is a reserved operator keyword.
pub fn is_reserved_word(word: &str) -> bool {
    matches!(word, "AND" | "OR" | "NOT")
}

/// Character-level cursor over a query string.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    /// The original input string.
    input: &'a str,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// The full input string.
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Rewinds to a position previously returned by [`Self::position`].
    pub fn restore(&mut self, position: usize) {
        self.position = position;
    }

    /// The unconsumed tail of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    /// The input between `start` and the current position.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.position]
    }

    /// True once every character has been consumed.
    pub fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Returns the current character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes and returns the current character.
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    /// Consumes `ch` if it is the current character.
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.position += ch.len_utf8();
            true
        } else {
            false
        }
    }

    /// Consumes `literal` only when it is followed by whitespace or end of
    /// input, the boundary that separates an operator from a term.
    pub fn eat_symbol(&mut self, literal: &str) -> bool {
        if let Some(rest) = self.rest().strip_prefix(literal) {
            if rest.chars().next().is_none_or(char::is_whitespace) {
                self.position += literal.len();
                return true;
            }
        }
        false
    }

    /// Skips a run of whitespace characters.
    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.position += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    /// True at a token boundary: whitespace or end of input.
    pub fn at_boundary(&self) -> bool {
        self.peek().is_none_or(char::is_whitespace)
    }

    /// Reads an identifier, or returns `None` without advancing.
    pub fn read_identifier(&mut self) -> Option<&'a str> {
        let start = self.position;
        match self.peek() {
            Some(ch) if is_identifier_start(ch) => {
                self.bump();
            }
            _ => return None,
        }
        while let Some(ch) = self.peek() {
            if is_identifier_char(ch) {
                self.bump();
            } else {
                break;
            }
        }
        Some(&self.input[start..self.position])
    }

    /// Reads a run of ASCII digits, or returns `None` without advancing.
    pub fn read_digits(&mut self) -> Option<&'a str> {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
        if self.position == start {
            None
        } else {
            Some(&self.input[start..self.position])
        }
    }

    /// Describes the current character for error messages.
    pub fn describe_here(&self) -> String {
        match self.peek() {
            None => "end of input".to_string(),
            Some(ch) if ch.is_whitespace() => "whitespace".to_string(),
            Some(ch) => format!("'{ch}'"),
        }
    }

    /// Creates an error at a specific position.
    pub fn error(&self, kind: ParseErrorKind, position: usize) -> ParseError {
        ParseError::new(kind, position, self.input)
    }

    /// Creates an `UnexpectedToken` error at the current position.
    pub fn unexpected(&self, expected: &str) -> ParseError {
        self.error(
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.describe_here(),
            },
            self.position,
        )
    }
}
