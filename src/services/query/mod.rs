pub mod pageable;
pub mod paginated;
pub mod predicate;

pub use pageable::{GenericFilters, PageRequest, Pageable, SortDirection, normalize};
pub use paginated::{Page, PagedSource, PaginatedResult, fetch_paginated};
pub use predicate::{ExactValue, FilterField, Filterable, Predicate};
