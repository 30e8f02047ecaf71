use serde::{Deserialize, Serialize};

use crate::services::query::predicate::FilterField;

pub const DEFAULT_PAGE: i64 = 0;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const DEFAULT_SORT_BY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Paging part of every list request body. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenericFilters {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    pub page: i64,
    pub page_size: i64,
    pub sort_by: String,
    pub sort_direction: SortDirection,
}

/// Total: any input maps to a usable page request.
pub fn normalize(filters: &GenericFilters) -> Pageable {
    let page = filters.page.unwrap_or(DEFAULT_PAGE).max(0);
    let page_size = filters
        .page_size
        .filter(|size| *size > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let sort_by = filters
        .sort_by
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SORT_BY)
        .to_string();

    Pageable {
        page,
        page_size,
        sort_by,
        sort_direction: filters.sort_direction.unwrap_or_default(),
    }
}

impl GenericFilters {
    pub fn pageable(&self) -> Pageable {
        normalize(self)
    }
}

impl From<Pageable> for GenericFilters {
    fn from(p: Pageable) -> Self {
        Self {
            page: Some(p.page),
            page_size: Some(p.page_size),
            sort_by: Some(p.sort_by),
            sort_direction: Some(p.sort_direction),
        }
    }
}

/// A `Pageable` whose sort key has been resolved to a concrete field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub page: i64,
    pub page_size: i64,
    pub sort: F,
    pub direction: SortDirection,
}

impl<F> PageRequest<F> {
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.page_size)
    }
}

impl Pageable {
    /// `None` when `sort_by` names no sortable field of `F`.
    pub fn resolve<F: FilterField>(&self) -> Option<PageRequest<F>> {
        F::from_sort_key(&self.sort_by).map(|sort| PageRequest {
            page: self.page,
            page_size: self.page_size,
            sort,
            direction: self.sort_direction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn degenerate_input_normalizes_to_defaults() {
        let filters = GenericFilters {
            page: Some(-5),
            page_size: Some(0),
            sort_by: Some("".into()),
            sort_direction: None,
        };

        assert_eq!(
            normalize(&filters),
            Pageable {
                page: 0,
                page_size: 10,
                sort_by: "id".into(),
                sort_direction: SortDirection::Asc,
            }
        );
        assert_eq!(normalize(&GenericFilters::default()), normalize(&filters));
    }

    #[test]
    fn given_values_are_kept() {
        let filters = GenericFilters {
            page: Some(3),
            page_size: Some(25),
            sort_by: Some(" uuid ".into()),
            sort_direction: Some(SortDirection::Desc),
        };

        let p = normalize(&filters);
        assert_eq!((p.page, p.page_size), (3, 25));
        assert_eq!(p.sort_by, "uuid");
        assert_eq!(p.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn body_parsing_accepts_partial_and_lowercase_input() {
        let f: GenericFilters =
            serde_json::from_str(r#"{"pageSize": 5, "sortDirection": "desc"}"#).unwrap();
        assert_eq!(f.page, None);
        assert_eq!(f.page_size, Some(5));
        assert_eq!(f.sort_direction, Some(SortDirection::Desc));

        let f: GenericFilters = serde_json::from_str(r#"{"page": null}"#).unwrap();
        assert_eq!(f, GenericFilters::default());
    }

    #[test]
    fn offset_saturates() {
        let req = PageRequest {
            page: i64::MAX,
            page_size: 10,
            sort: (),
            direction: SortDirection::Asc,
        };
        assert_eq!(req.offset(), i64::MAX);
    }

    fn any_filters() -> impl Strategy<Value = GenericFilters> {
        (
            proptest::option::of(any::<i64>()),
            proptest::option::of(any::<i64>()),
            proptest::option::of("[ a-zA-Z]{0,8}"),
            proptest::option::of(prop_oneof![
                Just(SortDirection::Asc),
                Just(SortDirection::Desc)
            ]),
        )
            .prop_map(|(page, page_size, sort_by, sort_direction)| GenericFilters {
                page,
                page_size,
                sort_by,
                sort_direction,
            })
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(filters in any_filters()) {
            let once = normalize(&filters);
            let twice = normalize(&GenericFilters::from(once.clone()));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn normalize_is_always_valid(filters in any_filters()) {
            let p = normalize(&filters);
            prop_assert!(p.page >= 0);
            prop_assert!(p.page_size > 0);
            prop_assert!(!p.sort_by.trim().is_empty());
        }
    }
}
