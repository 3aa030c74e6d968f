//! Query parser.
//!
//! Parses a query string into its top-level sequence of ASTs using
//! recursive descent over the raw input.
//!
//! # Grammar
//!
//! ```text
//! queries → chain+                                (whitespace separated)
//! chain   → unary (("AND" | "&&" | "OR" | "||") unary)*
//! unary   → ("NOT" | "!") unary | "+" unary | "-" unary | primary
//! primary → (group | field | leaf) boost?
//! group   → "(" queries ")" ("@" INT)?
//! field   → IDENT ":" (leaf | group)
//! leaf    → PHRASE ("~" INT)? | REGEX | range | word
//! range   → ("[" | "{") bound "TO" bound ("]" | "}")
//! word    → IDENT with trailing "*" / "?" / "~" modifiers
//! boost   → "^" FLOAT
//! ```
//!
//! # Precedence
//!
//! `AND` (and `&&`) binds tighter than `OR` (and `||`), and chains of the
//! same operator flatten into a single node. Whitespace between chains
//! carries no boolean meaning: the chains stay separate entries in the
//! returned sequence, so `a AND b c` parses as `[And([a, b]), c]`.
//!
//! Operator keywords are recognised only when followed by whitespace or
//! end of input; `ANDroid` is an ordinary term.

use crate::{
    assoc::{InfixOp, associate},
    ast::Query,
    error::{ParseError, ParseErrorKind},
    scan::{Scanner, is_identifier_start, is_reserved_word},
    term,
};

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Maximum nesting depth before parsing fails with
    /// [`ParseErrorKind::DepthExceeded`] instead of exhausting the stack.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 1024 }
    }
}

/// Recursive descent parser over a character scanner.
struct Parser<'a> {
    /// Character cursor over the input.
    sc: Scanner<'a>,
    /// Current recursion depth.
    depth: usize,
    /// Depth at which parsing gives up.
    max_depth: usize,
}

/// Parses a query string into its top-level sequence.
///
/// The returned vector is never empty; blank input is an error. Items in
/// the sequence are separated by whitespace in the input and carry no
/// boolean relationship to each other.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; there is no recovery.
pub fn parse(input: &str) -> Result<Vec<Query>, ParseError> {
    parse_with(input, ParseOptions::default())
}

/// Parses a query string with explicit limits.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; there is no recovery.
pub fn parse_with(input: &str, options: ParseOptions) -> Result<Vec<Query>, ParseError> {
    let mut parser = Parser {
        sc: Scanner::new(input),
        depth: 0,
        max_depth: options.max_depth,
    };
    let queries = parser.parse_queries()?;
    parser.sc.skip_whitespace();
    if !parser.sc.at_end() {
        let position = parser.sc.position();
        return Err(parser.sc.error(ParseErrorKind::TrailingInput, position));
    }
    Ok(queries)
}

impl Parser<'_> {
    /// Parses one or more whitespace-separated operator chains, stopping
    /// at end of input or a closing parenthesis.
    fn parse_queries(&mut self) -> Result<Vec<Query>, ParseError> {
        self.sc.skip_whitespace();
        let mut queries = vec![self.parse_chain()?];
        loop {
            self.sc.skip_whitespace();
            if self.sc.at_end() || self.sc.peek() == Some(')') {
                break;
            }
            queries.push(self.parse_chain()?);
        }
        Ok(queries)
    }

    /// Parses one operator chain and folds it with the associator.
    fn parse_chain(&mut self) -> Result<Query, ParseError> {
        let first = self.parse_unary()?;
        let mut rest = Vec::new();
        loop {
            let checkpoint = self.sc.position();
            self.sc.skip_whitespace();
            let operator_position = self.sc.position();
            let Some((op, symbol)) = self.eat_infix_operator() else {
                self.sc.restore(checkpoint);
                break;
            };
            self.sc.skip_whitespace();
            if self.sc.at_end() {
                return Err(self.sc.error(
                    ParseErrorKind::TrailingOperator {
                        operator: symbol.to_string(),
                    },
                    operator_position,
                ));
            }
            rest.push((op, self.parse_unary()?));
        }
        Ok(associate(first, rest))
    }

    /// Consumes a binary operator if one sits at the cursor. Keywords and
    /// symbol pairs count only when followed by whitespace or end of
    /// input.
    fn eat_infix_operator(&mut self) -> Option<(InfixOp, &'static str)> {
        if self.sc.eat_symbol("&&") {
            return Some((InfixOp::And, "&&"));
        }
        if self.sc.eat_symbol("||") {
            return Some((InfixOp::Or, "||"));
        }
        let checkpoint = self.sc.position();
        if let Some(word) = self.sc.read_identifier() {
            if self.sc.at_boundary() {
                match word {
                    "AND" => return Some((InfixOp::And, "AND")),
                    "OR" => return Some((InfixOp::Or, "OR")),
                    _ => {}
                }
            }
            self.sc.restore(checkpoint);
        }
        None
    }

    /// Parses prefix operators and their operand, guarding recursion
    /// depth.
    fn parse_unary(&mut self) -> Result<Query, ParseError> {
        if self.depth >= self.max_depth {
            let position = self.sc.position();
            return Err(self.sc.error(
                ParseErrorKind::DepthExceeded {
                    limit: self.max_depth,
                },
                position,
            ));
        }
        self.depth += 1;
        let result = self.parse_unary_inner();
        self.depth -= 1;
        result
    }

    /// Dispatches on the prefix operator, if any.
    fn parse_unary_inner(&mut self) -> Result<Query, ParseError> {
        match self.sc.peek() {
            Some('+') => {
                let operand = self.parse_signed_operand('+')?;
                Ok(Query::UnaryPlus(Box::new(operand)))
            }
            Some('-') => {
                let operand = self.parse_signed_operand('-')?;
                Ok(Query::UnaryMinus(Box::new(operand)))
            }
            Some('!') => {
                self.sc.bump();
                if !self.sc.at_boundary() {
                    return Err(self.sc.unexpected("whitespace after '!'"));
                }
                self.sc.skip_whitespace();
                if self.sc.at_end() {
                    return Err(self.sc.unexpected("a query after '!'"));
                }
                Ok(Query::Not(Box::new(self.parse_unary()?)))
            }
            Some(ch) if is_identifier_start(ch) => {
                let checkpoint = self.sc.position();
                if self.sc.read_identifier() == Some("NOT") && self.sc.at_boundary() {
                    self.sc.skip_whitespace();
                    if self.sc.at_end() {
                        return Err(self.sc.unexpected("a query after 'NOT'"));
                    }
                    return Ok(Query::Not(Box::new(self.parse_unary()?)));
                }
                self.sc.restore(checkpoint);
                self.parse_primary()
            }
            _ => self.parse_primary(),
        }
    }

    /// Parses the operand of a `+` or `-` prefix, which must follow with
    /// no intervening whitespace.
    fn parse_signed_operand(&mut self, sign: char) -> Result<Query, ParseError> {
        self.sc.bump();
        if self.sc.at_boundary() {
            return Err(self
                .sc
                .unexpected(&format!("a query immediately after '{sign}'")));
        }
        self.parse_unary()
    }

    /// Parses a primary query and any adjacent boost suffix.
    fn parse_primary(&mut self) -> Result<Query, ParseError> {
        let query = match self.sc.peek() {
            Some('(') => self.parse_group()?,
            Some(ch) if is_identifier_start(ch) => self.parse_field_or_leaf()?,
            _ => term::parse_leaf(&mut self.sc)?,
        };
        self.maybe_boost(query)
    }

    /// Distinguishes `ident:value` field qualifiers from plain leaves.
    fn parse_field_or_leaf(&mut self) -> Result<Query, ParseError> {
        let checkpoint = self.sc.position();
        let Some(word) = self.sc.read_identifier() else {
            return term::parse_leaf(&mut self.sc);
        };
        if !self.sc.eat(':') {
            self.sc.restore(checkpoint);
            return term::parse_leaf(&mut self.sc);
        }
        if is_reserved_word(word) {
            return Err(self.sc.error(
                ParseErrorKind::ReservedFieldName {
                    name: word.to_string(),
                },
                checkpoint,
            ));
        }

        // The value is a single adjacent leaf or group, never a sequence:
        // in `title:The cat`, only `The` is scoped to the field.
        let value = match self.sc.peek() {
            Some('(') => self.parse_group()?,
            Some(ch) if matches!(ch, '"' | '/' | '[' | '{') || is_identifier_start(ch) => {
                term::parse_leaf(&mut self.sc)?
            }
            _ => return Err(self.sc.unexpected("a term or group after ':'")),
        };
        Ok(Query::Field {
            name: word.to_string(),
            query: Box::new(value),
        })
    }

    /// Parses `( ... )`; an adjacent `@n` reinterprets the group as a
    /// minimum-match query over its items.
    fn parse_group(&mut self) -> Result<Query, ParseError> {
        self.sc.bump(); // opening parenthesis
        let mut queries = self.parse_queries()?;
        if !self.sc.eat(')') {
            return Err(self.sc.unexpected("closing ')'"));
        }
        if self.sc.eat('@') {
            let min = term::parse_integer(&mut self.sc, '@')?;
            return Ok(Query::MinimumMatch { queries, min });
        }
        let inner = if queries.len() == 1 {
            queries.remove(0)
        } else {
            Query::or(queries)
        };
        Ok(Query::Group(Box::new(inner)))
    }

    /// Applies a `^factor` suffix when one is adjacent.
    fn maybe_boost(&mut self, query: Query) -> Result<Query, ParseError> {
        if self.sc.eat('^') {
            let factor = term::parse_boost_factor(&mut self.sc)?;
            return Ok(Query::Boost {
                query: Box::new(query),
                factor,
            });
        }
        Ok(query)
    }
}
