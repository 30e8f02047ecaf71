//! Renders a `Predicate` into a Postgres `WHERE` fragment.
//!
//! Column names come from the closed field enum; every value is bound.
use sqlx::{Postgres, QueryBuilder};

use crate::services::query::{ExactValue, FilterField, Predicate};

pub trait SqlField: FilterField {
    fn column(&self) -> &'static str;
}

pub fn push_predicate<F: SqlField>(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate<F>) {
    match predicate {
        Predicate::AlwaysTrue => {
            qb.push("TRUE");
        }
        Predicate::StringContainsCaseInsensitive { field, value } => {
            // strpos keeps % and _ in the filter value literal
            qb.push("strpos(UPPER(")
                .push(field.column())
                .push("), UPPER(")
                .push_bind(value.clone())
                .push(")) > 0");
        }
        Predicate::ExactMatchThroughRelation { field, value } => {
            qb.push(field.column()).push(" = ");
            match value {
                ExactValue::Bool(v) => qb.push_bind(*v),
                ExactValue::Int(v) => qb.push_bind(*v),
                ExactValue::Text(v) => qb.push_bind(v.clone()),
            };
        }
        Predicate::And(terms) if terms.is_empty() => {
            qb.push("TRUE");
        }
        Predicate::And(terms) => {
            qb.push("(");
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    qb.push(" AND ");
                }
                push_predicate(qb, term);
            }
            qb.push(")");
        }
    }
}
