//! Query abstract syntax tree.
//!
//! Immutable values produced by the parser and rendered by the printer.
//! Term-level variants are leaves; the rest are compound nodes holding
//! boxed children.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One atom of a wildcard word.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WildcardOp {
    /// `?`: matches exactly one character.
    SingleChar,
    /// `*`: matches any run of characters, including none.
    ManyChar,
    /// A literal fragment between wildcard characters.
    Str(String),
}

/// A parsed query.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// A single bare word.
    Term(String),

    /// A quoted literal, quotes stripped and content preserved.
    Phrase(String),

    /// A word ending in `*`: matches terms starting with the stem.
    Prefix(String),

    /// A quoted literal allowed up to the given number of intervening words.
    Proximity(String, u32),

    /// An approximate term with an optional edit distance.
    Fuzzy(String, Option<u32>),

    /// A `/.../` regular expression literal, body kept verbatim.
    Regex(String),

    /// An interval over terms.
    Range {
        /// Lower endpoint, absent when that side is open.
        lower: Option<String>,
        /// Upper endpoint, absent when that side is open.
        upper: Option<String>,
        /// Whether the lower endpoint itself matches (`[` vs `{`).
        lower_inclusive: bool,
        /// Whether the upper endpoint itself matches (`]` vs `}`).
        upper_inclusive: bool,
    },

    /// A word containing `?` or `*` atoms, in input order.
    Wildcard(Vec<WildcardOp>),

    /// Disjunction: at least one sub-query must match. Holds two or more
    /// sub-queries.
    Or(Vec<Self>),

    /// Conjunction: all sub-queries must match. Holds two or more
    /// sub-queries.
    And(Vec<Self>),

    /// Negation: results must NOT match the inner query.
    Not(Box<Self>),

    /// A parenthesised query.
    Group(Box<Self>),

    /// `+q`: the inner query must be present.
    UnaryPlus(Box<Self>),

    /// `-q`: the inner query must be absent.
    UnaryMinus(Box<Self>),

    /// Field-scoped query: match only within a specific field.
    Field {
        /// Field name.
        name: String,
        /// The query to match within that field.
        query: Box<Self>,
    },

    /// Boosted query: multiplies the score of the inner query.
    Boost {
        /// The boosted query.
        query: Box<Self>,
        /// The boost factor (e.g., 2.5 means 2.5x the normal score).
        factor: f32,
    },

    /// `(...)@n`: at least `min` of the listed queries must match.
    MinimumMatch {
        /// Candidate queries.
        queries: Vec<Self>,
        /// How many of them must match.
        min: u32,
    },
}

impl Query {
    /// Creates an And query, flattening nested Ands.
    ///
    /// # Panics
    ///
    /// Panics when fewer than two queries are supplied; a conjunction of
    /// one thing is a programming error, not a query.
    pub fn and(queries: Vec<Self>) -> Self {
        assert!(queries.len() >= 2, "And requires at least two queries");
        let flattened: Vec<Self> = queries
            .into_iter()
            .flat_map(|q| match q {
                Self::And(inner) => inner,
                other => vec![other],
            })
            .collect();
        Self::And(flattened)
    }

    /// Creates an Or query, flattening nested Ors.
    ///
    /// # Panics
    ///
    /// Panics when fewer than two queries are supplied.
    pub fn or(queries: Vec<Self>) -> Self {
        assert!(queries.len() >= 2, "Or requires at least two queries");
        let flattened: Vec<Self> = queries
            .into_iter()
            .flat_map(|q| match q {
                Self::Or(inner) => inner,
                other => vec![other],
            })
            .collect();
        Self::Or(flattened)
    }

    /// Returns true for term-level (leaf) queries.
    pub fn is_term(&self) -> bool {
        matches!(
            self,
            Self::Term(_)
                | Self::Phrase(_)
                | Self::Prefix(_)
                | Self::Proximity(..)
                | Self::Fuzzy(..)
                | Self::Regex(_)
                | Self::Range { .. }
                | Self::Wildcard(_)
        )
    }
}

/// Rewrites the rightmost term-level leaf of the last query in `queries`.
///
/// Compound nodes are descended through their last child until a leaf is
/// reached, which is replaced by `f(leaf)`. Search-as-you-type callers use
/// this to treat the word still being typed as a prefix.
pub fn map_last_term<F>(queries: Vec<Query>, f: F) -> Vec<Query>
where
    F: FnOnce(Query) -> Query,
{
    map_last_in(queries, f)
}

/// Descends to the rightmost leaf of `query` and applies `f` to it.
fn map_last<F>(query: Query, f: F) -> Query
where
    F: FnOnce(Query) -> Query,
{
    match query {
        Query::Or(queries) => Query::Or(map_last_in(queries, f)),
        Query::And(queries) => Query::And(map_last_in(queries, f)),
        Query::MinimumMatch { queries, min } => Query::MinimumMatch {
            queries: map_last_in(queries, f),
            min,
        },
        Query::Not(inner) => Query::Not(Box::new(map_last(*inner, f))),
        Query::Group(inner) => Query::Group(Box::new(map_last(*inner, f))),
        Query::UnaryPlus(inner) => Query::UnaryPlus(Box::new(map_last(*inner, f))),
        Query::UnaryMinus(inner) => Query::UnaryMinus(Box::new(map_last(*inner, f))),
        Query::Field { name, query } => Query::Field {
            name,
            query: Box::new(map_last(*query, f)),
        },
        Query::Boost { query, factor } => Query::Boost {
            query: Box::new(map_last(*query, f)),
            factor,
        },
        leaf => f(leaf),
    }
}

/// Applies `map_last` to the final element of a child list.
fn map_last_in<F>(mut queries: Vec<Query>, f: F) -> Vec<Query>
where
    F: FnOnce(Query) -> Query,
{
    if let Some(last) = queries.pop() {
        queries.push(map_last(last, f));
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_flattens_nested() {
        let nested = Query::and(vec![
            Query::Term("a".into()),
            Query::And(vec![Query::Term("b".into()), Query::Term("c".into())]),
        ]);

        assert_eq!(
            nested,
            Query::And(vec![
                Query::Term("a".into()),
                Query::Term("b".into()),
                Query::Term("c".into()),
            ])
        );
    }

    #[test]
    fn or_flattens_nested() {
        let nested = Query::or(vec![
            Query::Or(vec![Query::Term("a".into()), Query::Term("b".into())]),
            Query::Term("c".into()),
        ]);

        assert_eq!(
            nested,
            Query::Or(vec![
                Query::Term("a".into()),
                Query::Term("b".into()),
                Query::Term("c".into()),
            ])
        );
    }

    #[test]
    #[should_panic(expected = "at least two")]
    fn and_rejects_single_element() {
        let _ = Query::and(vec![Query::Term("a".into())]);
    }

    #[test]
    #[should_panic(expected = "at least two")]
    fn or_rejects_empty() {
        let _ = Query::or(vec![]);
    }

    #[test]
    fn leaves_are_terms() {
        assert!(Query::Term("a".into()).is_term());
        assert!(Query::Prefix("a".into()).is_term());
        assert!(
            Query::Range {
                lower: None,
                upper: Some("z".into()),
                lower_inclusive: true,
                upper_inclusive: false,
            }
            .is_term()
        );
        assert!(!Query::Not(Box::new(Query::Term("a".into()))).is_term());
        assert!(!Query::Group(Box::new(Query::Term("a".into()))).is_term());
    }

    #[test]
    fn map_last_term_rewrites_final_leaf() {
        let queries = vec![
            Query::Term("first".into()),
            Query::And(vec![Query::Term("a".into()), Query::Term("b".into())]),
        ];

        let rewritten = map_last_term(queries, |leaf| match leaf {
            Query::Term(word) => Query::Prefix(word),
            other => other,
        });

        assert_eq!(
            rewritten,
            vec![
                Query::Term("first".into()),
                Query::And(vec![Query::Term("a".into()), Query::Prefix("b".into())]),
            ]
        );
    }

    #[test]
    fn map_last_term_descends_compound_nodes() {
        let queries = vec![Query::Field {
            name: "title".into(),
            query: Box::new(Query::Group(Box::new(Query::Term("gui".into())))),
        }];

        let rewritten = map_last_term(queries, |leaf| match leaf {
            Query::Term(word) => Query::Prefix(word),
            other => other,
        });

        assert_eq!(
            rewritten,
            vec![Query::Field {
                name: "title".into(),
                query: Box::new(Query::Group(Box::new(Query::Prefix("gui".into())))),
            }]
        );
    }

    #[test]
    fn map_last_term_on_empty_sequence() {
        let rewritten = map_last_term(vec![], |leaf| leaf);
        assert!(rewritten.is_empty());
    }
}
