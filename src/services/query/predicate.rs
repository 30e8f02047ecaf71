//! Composable record predicates over a closed set of typed fields.
//!
//! A predicate can be evaluated in memory (`matches`) or handed to the
//! storage layer, which turns it into a `WHERE` clause.
use std::fmt;

/// Closed set of filterable/sortable fields for one record type.
pub trait FilterField: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    fn from_sort_key(key: &str) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExactValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for ExactValue {
    fn from(v: bool) -> Self {
        ExactValue::Bool(v)
    }
}

impl From<String> for ExactValue {
    fn from(v: String) -> Self {
        ExactValue::Text(v)
    }
}

/// Field access used by in-memory evaluation.
pub trait Filterable<F> {
    fn text(&self, field: F) -> Option<&str>;
    fn exact(&self, field: F) -> Option<ExactValue>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<F> {
    AlwaysTrue,
    StringContainsCaseInsensitive { field: F, value: String },
    ExactMatchThroughRelation { field: F, value: ExactValue },
    And(Vec<Predicate<F>>),
}

impl<F: FilterField> Predicate<F> {
    /// Blank or absent input yields `AlwaysTrue`.
    pub fn contains_ignore_case(field: F, value: Option<&str>) -> Self {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(v) => Predicate::StringContainsCaseInsensitive {
                field,
                value: v.to_string(),
            },
            None => Predicate::AlwaysTrue,
        }
    }

    pub fn exact_through_relation<V: Into<ExactValue>>(field: F, value: Option<V>) -> Self {
        match value {
            Some(v) => Predicate::ExactMatchThroughRelation {
                field,
                value: v.into(),
            },
            None => Predicate::AlwaysTrue,
        }
    }

    /// Logical AND; `AlwaysTrue` is dropped and nested `And`s are flattened.
    pub fn and(self, other: Predicate<F>) -> Self {
        let mut terms = Vec::new();
        for p in [self, other] {
            match p {
                Predicate::AlwaysTrue => {}
                Predicate::And(inner) => terms.extend(inner),
                term => terms.push(term),
            }
        }

        match terms.len() {
            0 => Predicate::AlwaysTrue,
            1 => terms.pop().unwrap_or(Predicate::AlwaysTrue),
            _ => Predicate::And(terms),
        }
    }

    pub fn all<I: IntoIterator<Item = Predicate<F>>>(terms: I) -> Self {
        terms
            .into_iter()
            .fold(Predicate::AlwaysTrue, Predicate::and)
    }

    pub fn is_always_true(&self) -> bool {
        match self {
            Predicate::AlwaysTrue => true,
            Predicate::And(terms) => terms.iter().all(Predicate::is_always_true),
            _ => false,
        }
    }

    pub fn matches<R: Filterable<F>>(&self, record: &R) -> bool {
        match self {
            Predicate::AlwaysTrue => true,
            Predicate::StringContainsCaseInsensitive { field, value } => record
                .text(*field)
                .is_some_and(|stored| stored.to_uppercase().contains(&value.to_uppercase())),
            Predicate::ExactMatchThroughRelation { field, value } => {
                record.exact(*field).as_ref() == Some(value)
            }
            Predicate::And(terms) => terms.iter().all(|t| t.matches(record)),
        }
    }
}
