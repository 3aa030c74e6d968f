//! Leaf parsers.
//!
//! A leaf is a single term-level query: a quoted phrase (optionally with
//! a proximity suffix), a regex literal, a range, or an identifier-led
//! word classified by its trailing modifiers. The numeric suffix readers
//! shared with the composite layer also live here.

use std::mem;

use crate::{
    ast::{Query, WildcardOp},
    error::{ParseError, ParseErrorKind},
    scan::{Scanner, is_identifier_char, is_identifier_start, is_reserved_word},
};

/// Parses one term-level query, chosen by single-character lookahead.
pub fn parse_leaf(sc: &mut Scanner) -> Result<Query, ParseError> {
    match sc.peek() {
        Some('"') => parse_phrase(sc),
        Some('/') => parse_regex(sc),
        Some('[' | '{') => parse_range(sc),
        Some(ch) if is_identifier_start(ch) => parse_word(sc),
        _ => Err(sc.unexpected("a term")),
    }
}

/// Parses a quoted phrase; an adjacent `~n` upgrades it to a proximity
/// query.
fn parse_phrase(sc: &mut Scanner) -> Result<Query, ParseError> {
    let start = sc.position();
    sc.bump(); // opening quote

    let mut body = String::new();
    loop {
        match sc.bump() {
            Some('"') => break,
            Some(ch) => body.push(ch),
            None => {
                return Err(sc.error(ParseErrorKind::UnterminatedLiteral { delimiter: '"' }, start));
            }
        }
    }

    if sc.eat('~') {
        let distance = parse_integer(sc, '~')?;
        return Ok(Query::Proximity(body, distance));
    }
    Ok(Query::Phrase(body))
}

/// Parses a `/.../` regex literal.
///
/// A backslash escapes the character after it for termination purposes
/// only; the body is kept verbatim, backslashes included, and the printer
/// emits it back unchanged.
fn parse_regex(sc: &mut Scanner) -> Result<Query, ParseError> {
    let start = sc.position();
    sc.bump(); // opening slash

    let mut body = String::new();
    loop {
        match sc.bump() {
            Some('/') => return Ok(Query::Regex(body)),
            Some('\\') => {
                body.push('\\');
                match sc.bump() {
                    Some(ch) => body.push(ch),
                    None => {
                        return Err(
                            sc.error(ParseErrorKind::UnterminatedLiteral { delimiter: '/' }, start)
                        );
                    }
                }
            }
            Some(ch) => body.push(ch),
            None => {
                return Err(sc.error(ParseErrorKind::UnterminatedLiteral { delimiter: '/' }, start));
            }
        }
    }
}

/// Parses `[a TO b]` and friends. The opening bracket picks the lower
/// inclusivity, the closing bracket the upper; `*` leaves a side open.
fn parse_range(sc: &mut Scanner) -> Result<Query, ParseError> {
    let lower_inclusive = sc.bump() == Some('[');
    sc.skip_whitespace();
    let lower = parse_bound(sc)?;
    sc.skip_whitespace();
    if !sc.eat_symbol("TO") {
        return Err(sc.unexpected("'TO'"));
    }
    sc.skip_whitespace();
    let upper = parse_bound(sc)?;
    sc.skip_whitespace();
    let upper_inclusive = match sc.peek() {
        Some(']') => true,
        Some('}') => false,
        _ => return Err(sc.unexpected("closing ']' or '}'")),
    };
    sc.bump();
    Ok(Query::Range {
        lower,
        upper,
        lower_inclusive,
        upper_inclusive,
    })
}

/// Reads one range endpoint; the `*` sentinel means that side is open.
fn parse_bound(sc: &mut Scanner) -> Result<Option<String>, ParseError> {
    let mut word = String::new();
    while let Some(ch) = sc.peek() {
        if ch.is_whitespace() || ch == ']' || ch == '}' {
            break;
        }
        word.push(ch);
        sc.bump();
    }
    if word.is_empty() {
        return Err(sc.unexpected("a range bound"));
    }
    if word == "*" { Ok(None) } else { Ok(Some(word)) }
}

/// Parses an identifier-led word and classifies it by its trailing
/// modifiers: plain term, fuzzy term, prefix, or wildcard.
fn parse_word(sc: &mut Scanner) -> Result<Query, ParseError> {
    let start = sc.position();
    let Some(word) = sc.read_identifier() else {
        return Err(sc.unexpected("a term"));
    };

    if matches!(sc.peek(), Some('*' | '?')) {
        return Ok(parse_wildcard(sc, word));
    }

    if sc.eat('~') {
        if sc.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            let distance = parse_integer(sc, '~')?;
            return Ok(Query::Fuzzy(word.to_string(), Some(distance)));
        }
        return Ok(Query::Fuzzy(word.to_string(), None));
    }

    if is_reserved_word(word) {
        return Err(sc.error(
            ParseErrorKind::UnexpectedToken {
                expected: "a term".to_string(),
                found: format!("reserved operator '{word}'"),
            },
            start,
        ));
    }
    Ok(Query::Term(word.to_string()))
}

/// Continues a word that contains `*` or `?`, collecting its atoms in
/// input order. A word that is just a stem plus one trailing `*` is a
/// prefix query, not a wildcard.
fn parse_wildcard(sc: &mut Scanner, leading: &str) -> Query {
    let mut parts = vec![WildcardOp::Str(leading.to_string())];
    let mut run = String::new();
    while let Some(ch) = sc.peek() {
        match ch {
            '*' => {
                flush_run(&mut parts, &mut run);
                parts.push(WildcardOp::ManyChar);
            }
            '?' => {
                flush_run(&mut parts, &mut run);
                parts.push(WildcardOp::SingleChar);
            }
            _ if is_identifier_char(ch) => run.push(ch),
            _ => break,
        }
        sc.bump();
    }
    flush_run(&mut parts, &mut run);

    if let [WildcardOp::Str(stem), WildcardOp::ManyChar] = parts.as_slice() {
        return Query::Prefix(stem.clone());
    }
    Query::Wildcard(parts)
}

/// Pushes the pending literal run onto the atom list.
fn flush_run(parts: &mut Vec<WildcardOp>, run: &mut String) {
    if !run.is_empty() {
        parts.push(WildcardOp::Str(mem::take(run)));
    }
}

/// Parses the non-negative integer that follows a `~` or `@` operator.
/// A decimal point is rejected; these suffixes take whole numbers only.
pub fn parse_integer(sc: &mut Scanner, operator: char) -> Result<u32, ParseError> {
    let start = sc.position();
    let Some(digits) = sc.read_digits() else {
        return Err(sc.error(
            ParseErrorKind::InvalidNumber {
                operator,
                found: sc.describe_here(),
            },
            start,
        ));
    };
    if sc.peek() == Some('.') {
        let tail: String = sc
            .rest()
            .chars()
            .take_while(|ch| *ch == '.' || ch.is_ascii_digit())
            .collect();
        return Err(sc.error(
            ParseErrorKind::InvalidNumber {
                operator,
                found: format!("'{digits}{tail}'"),
            },
            start,
        ));
    }
    digits.parse().map_err(|_| {
        sc.error(
            ParseErrorKind::InvalidNumber {
                operator,
                found: format!("'{digits}'"),
            },
            start,
        )
    })
}

/// Parses the non-negative float that follows a `^` boost operator.
pub fn parse_boost_factor(sc: &mut Scanner) -> Result<f32, ParseError> {
    let start = sc.position();
    if sc.read_digits().is_none() {
        return Err(sc.error(
            ParseErrorKind::InvalidNumber {
                operator: '^',
                found: sc.describe_here(),
            },
            start,
        ));
    }
    if sc.eat('.') && sc.read_digits().is_none() {
        return Err(sc.error(
            ParseErrorKind::InvalidNumber {
                operator: '^',
                found: format!("'{}'", sc.slice_from(start)),
            },
            start,
        ));
    }
    let lexeme = sc.slice_from(start);
    let factor: f32 = lexeme.parse().map_err(|_| {
        sc.error(
            ParseErrorKind::InvalidNumber {
                operator: '^',
                found: format!("'{lexeme}'"),
            },
            start,
        )
    })?;
    if !factor.is_finite() {
        return Err(sc.error(
            ParseErrorKind::InvalidNumber {
                operator: '^',
                found: format!("'{lexeme}'"),
            },
            start,
        ));
    }
    Ok(factor)
}
