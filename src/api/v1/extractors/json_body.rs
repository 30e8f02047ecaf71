//! JSON bodies with AppError rejections.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;

pub struct JsonBody<T>(pub T);

/// Like `JsonBody`, but an absent, empty or `null` body yields `None`.
pub struct OptionalJsonBody<T>(pub Option<T>);

async fn read_body<S: Send + Sync>(req: Request, state: &S) -> Result<Bytes, AppError> {
    Bytes::from_request(req, state).await.map_err(|e| {
        debug!(error = %e, "request body could not be read");
        AppError::invalid_argument("Request", "request body could not be read")
    })
}

fn malformed(e: serde_json::Error) -> AppError {
    AppError::invalid_argument("Request", format!("malformed JSON body: {}", e))
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = read_body(req, state).await?;
        serde_json::from_slice(&bytes).map(JsonBody).map_err(malformed)
    }
}

impl<S, T> FromRequest<S> for OptionalJsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = read_body(req, state).await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJsonBody(None));
        }
        serde_json::from_slice::<Option<T>>(&bytes)
            .map(OptionalJsonBody)
            .map_err(malformed)
    }
}
