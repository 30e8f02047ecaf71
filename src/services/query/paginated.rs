use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::AppError;
use crate::repos::error::RepoResult;
use crate::services::query::pageable::{PageRequest, Pageable};
use crate::services::query::predicate::{FilterField, Predicate};

/// One page as returned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub number: i64,
    pub size: i64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.size <= 0 || self.total_elements <= 0 {
            return 0;
        }
        // ceiling division without `total + size - 1`, which overflows for huge sizes
        self.total_elements / self.size + i64::from(self.total_elements % self.size != 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number_of_elements: i64,
    pub current_page: i64,
    pub page_size: i64,
}

impl<T> From<Page<T>> for PaginatedResult<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            number_of_elements: page.content.len() as i64,
            total_elements: page.total_elements,
            total_pages,
            current_page: page.number,
            page_size: page.size,
            items: page.content,
        }
    }
}

impl<T> PaginatedResult<T> {
    pub fn map<U, M: FnMut(T) -> U>(self, f: M) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number_of_elements: self.number_of_elements,
            current_page: self.current_page,
            page_size: self.page_size,
        }
    }
}

/// Storage capability behind every paginated list.
#[async_trait]
pub trait PagedSource<T, F>: Send + Sync
where
    T: Send + 'static,
    F: FilterField,
{
    async fn find_page(&self, predicate: &Predicate<F>, request: &PageRequest<F>)
    -> RepoResult<Page<T>>;
}

pub async fn fetch_paginated<T, F, S>(
    source: &S,
    predicate: &Predicate<F>,
    pageable: &Pageable,
) -> Result<PaginatedResult<T>, AppError>
where
    T: Send + 'static,
    F: FilterField,
    S: PagedSource<T, F> + ?Sized,
{
    let request = pageable.resolve::<F>().ok_or_else(|| {
        AppError::invalid_argument("Sort", format!("cannot sort by '{}'", pageable.sort_by))
    })?;

    debug!(?predicate, ?request, "fetching page");
    let page = source.find_page(predicate, &request).await?;
    Ok(page.into())
}
