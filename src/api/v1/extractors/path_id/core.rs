/*
 * Responsibility
 *  - read one named numeric path variable into a typed id
 *  - a missing or non-numeric value is `<Resource>InvalidArgument` (400)
 *
 * Resource names and aliases live in types.rs.
 */
use std::collections::HashMap;
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

/// Binds a tag type to the path variable it is read from.
pub trait PathParam {
    const NAME: &'static str;
    const RESOURCE: &'static str;
}

pub struct PathId<T> {
    pub id: i64,
    _marker: PhantomData<T>,
}

impl<T> PathId<T> {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

impl<S, T> FromRequestParts<S> for PathId<T>
where
    S: Send + Sync,
    T: PathParam + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::invalid_argument(T::RESOURCE, "missing path parameters"))?;

        let raw = params.get(T::NAME).ok_or_else(|| {
            AppError::invalid_argument(T::RESOURCE, format!("missing path parameter {}", T::NAME))
        })?;

        let id = raw.parse::<i64>().map_err(|_| {
            AppError::invalid_argument(T::RESOURCE, format!("invalid {}: {}", T::NAME, raw))
        })?;

        Ok(Self::new(id))
    }
}

impl<T> std::fmt::Debug for PathId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathId").field("id", &self.id).finish()
    }
}
