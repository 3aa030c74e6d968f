//! Canonical rendering of query values.
//!
//! Every query prints to a string the parser accepts back into a
//! structurally equal value. Rendering is a single walk that writes
//! straight into the output; nothing is built per node.

use std::fmt::{self, Write};

use crate::ast::{Query, WildcardOp};

/// Renders one query in canonical textual form.
pub fn print(query: &Query) -> String {
    query.to_string()
}

/// Renders a top-level sequence, items separated by single spaces.
pub fn print_multi(queries: &[Query]) -> String {
    let parts: Vec<String> = queries.iter().map(ToString::to_string).collect();
    parts.join(" ")
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_query(self, f)
    }
}

/// Writes `query` to `out` in canonical form.
fn write_query(query: &Query, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    match query {
        Query::Term(word) => out.write_str(word),
        Query::Phrase(body) => write!(out, "\"{body}\""),
        Query::Prefix(stem) => write!(out, "{stem}*"),
        Query::Proximity(body, distance) => write!(out, "\"{body}\"~{distance}"),
        Query::Fuzzy(word, None) => write!(out, "{word}~"),
        Query::Fuzzy(word, Some(distance)) => write!(out, "{word}~{distance}"),
        Query::Regex(body) => write!(out, "/{body}/"),
        Query::Range {
            lower,
            upper,
            lower_inclusive,
            upper_inclusive,
        } => {
            out.write_char(if *lower_inclusive { '[' } else { '{' })?;
            write_bound(lower.as_deref(), out)?;
            out.write_str(" TO ")?;
            write_bound(upper.as_deref(), out)?;
            out.write_char(if *upper_inclusive { ']' } else { '}' })
        }
        Query::Wildcard(parts) => {
            for part in parts {
                match part {
                    WildcardOp::SingleChar => out.write_char('?')?,
                    WildcardOp::ManyChar => out.write_char('*')?,
                    WildcardOp::Str(run) => out.write_str(run)?,
                }
            }
            Ok(())
        }
        Query::Or(queries) => write_joined(queries, " OR ", out),
        Query::And(queries) => write_joined(queries, " AND ", out),
        Query::Not(inner) => {
            out.write_str("NOT ")?;
            write_query(inner, out)
        }
        Query::Group(inner) => {
            out.write_char('(')?;
            write_query(inner, out)?;
            out.write_char(')')
        }
        Query::UnaryPlus(inner) => {
            out.write_char('+')?;
            write_query(inner, out)
        }
        Query::UnaryMinus(inner) => {
            out.write_char('-')?;
            write_query(inner, out)
        }
        Query::Field { name, query } => {
            write!(out, "{name}:")?;
            write_query(query, out)
        }
        Query::Boost { query, factor } => {
            write_query(query, out)?;
            write!(out, "^{factor}")
        }
        Query::MinimumMatch { queries, min } => {
            out.write_char('(')?;
            write_joined(queries, " ", out)?;
            write!(out, ")@{min}")
        }
    }
}

/// Writes queries separated by `separator`.
fn write_joined(queries: &[Query], separator: &str, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (index, query) in queries.iter().enumerate() {
        if index > 0 {
            out.write_str(separator)?;
        }
        write_query(query, out)?;
    }
    Ok(())
}

/// Writes one range endpoint, `*` when that side is open.
fn write_bound(bound: Option<&str>, out: &mut fmt::Formatter<'_>) -> fmt::Result {
    match bound {
        Some(value) => out.write_str(value),
        None => out.write_char('*'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn term(word: &str) -> Query {
        Query::Term(word.into())
    }

    #[test]
    fn renders_leaves() {
        assert_eq!(print(&term("cat")), "cat");
        assert_eq!(print(&Query::Phrase("a b".into())), "\"a b\"");
        assert_eq!(print(&Query::Prefix("cat".into())), "cat*");
        assert_eq!(print(&Query::Proximity("a b".into(), 3)), "\"a b\"~3");
        assert_eq!(print(&Query::Fuzzy("cat".into(), None)), "cat~");
        assert_eq!(print(&Query::Fuzzy("cat".into(), Some(2))), "cat~2");
        assert_eq!(print(&Query::Regex("ab.*".into())), "/ab.*/");
    }

    #[test]
    fn renders_ranges() {
        assert_eq!(
            print(&Query::Range {
                lower: Some("a".into()),
                upper: Some("z".into()),
                lower_inclusive: true,
                upper_inclusive: true,
            }),
            "[a TO z]"
        );
        assert_eq!(
            print(&Query::Range {
                lower: None,
                upper: Some("z".into()),
                lower_inclusive: false,
                upper_inclusive: false,
            }),
            "{* TO z}"
        );
    }

    #[test]
    fn renders_wildcards() {
        assert_eq!(
            print(&Query::Wildcard(vec![
                WildcardOp::Str("wild".into()),
                WildcardOp::ManyChar,
                WildcardOp::Str("c".into()),
                WildcardOp::SingleChar,
            ])),
            "wild*c?"
        );
    }

    #[test]
    fn renders_compounds() {
        assert_eq!(
            print(&Query::And(vec![term("a"), term("b")])),
            "a AND b"
        );
        assert_eq!(print(&Query::Or(vec![term("a"), term("b")])), "a OR b");
        assert_eq!(print(&Query::Not(Box::new(term("a")))), "NOT a");
        assert_eq!(print(&Query::Group(Box::new(term("a")))), "(a)");
        assert_eq!(print(&Query::UnaryPlus(Box::new(term("a")))), "+a");
        assert_eq!(print(&Query::UnaryMinus(Box::new(term("a")))), "-a");
        assert_eq!(
            print(&Query::Field {
                name: "title".into(),
                query: Box::new(term("a")),
            }),
            "title:a"
        );
        assert_eq!(
            print(&Query::MinimumMatch {
                queries: vec![term("a"), term("b")],
                min: 2,
            }),
            "(a b)@2"
        );
    }

    #[test]
    fn boost_factor_drops_trailing_zero() {
        assert_eq!(
            print(&Query::Boost {
                query: Box::new(term("a")),
                factor: 2.0,
            }),
            "a^2"
        );
        assert_eq!(
            print(&Query::Boost {
                query: Box::new(term("a")),
                factor: 2.5,
            }),
            "a^2.5"
        );
    }

    #[test]
    fn multi_joins_with_single_spaces() {
        assert_eq!(print_multi(&[term("a"), term("b")]), "a b");
        assert_eq!(print_multi(&[term("a")]), "a");
    }

    #[test]
    fn round_trips_canonical_queries() {
        let canonical = [
            "the",
            "the cat jumped",
            "\"The cat jumped\"",
            "fieldName:\"The cat jumped\"",
            "\"derp lerp\"~3",
            "cat~ dog~2",
            "pre* wild*card te?t",
            "/ab.*c/",
            "[alpha TO omega] {a TO z} [* TO end] [start TO *]",
            "a AND b AND c",
            "a OR b OR c",
            "a AND b OR c",
            "derp AND lerp slerp orA OR orB last",
            "(title:test AND (pass OR fail)) AND \"extra phrase\"",
            "title:(a b)@2",
            "+cat -dog NOT fish",
            "rust^2.5 (a OR b)^0.5",
            "(a b c)@2",
            "NOT (a OR b)",
        ];

        for input in canonical {
            let parsed = parse(input).unwrap();
            assert_eq!(print_multi(&parsed), input, "round trip of {input:?}");

            let reparsed = parse(&print_multi(&parsed)).unwrap();
            assert_eq!(reparsed, parsed, "reparse of {input:?}");
        }
    }

    #[test]
    fn printed_groups_reparse_structurally_equal() {
        // `(a b)` is not canonical output; its parse prints as `(a OR b)`
        // and stays stable from there on.
        let parsed = parse("(a b)").unwrap();
        assert_eq!(print_multi(&parsed), "(a OR b)");
        assert_eq!(parse("(a OR b)").unwrap(), parsed);
    }
}
