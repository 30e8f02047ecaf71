/*
 * Responsibility
 * - the single AppError taxonomy every layer converts into
 * - IntoResponse: status code + JSON envelope with a stable `code`
 * - From conversions for repo, token and config failures
 */
use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::token::TokenError;

pub const TOKEN_EXPIRED_CODE: &str = "Token is expired";
pub const TOKEN_INVALID_CODE: &str = "Token is invalid";
pub const UNAUTHENTICATED_CODE: &str = "userNotAuthenticated";
pub const ACCESS_DENIED_CODE: &str = "userNotAuthorized";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("token expired: {0}")]
    TokenExpired(String),
    #[error("token invalid: {0}")]
    TokenInvalid(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("access denied")]
    AccessDenied,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{resource} not found: {message}")]
    NotFound {
        resource: &'static str,
        message: String,
    },
    #[error("{resource} already exists: {message}")]
    AlreadyExists {
        resource: &'static str,
        message: String,
    },
    #[error("{resource} invalid argument: {message}")]
    InvalidArgument {
        resource: &'static str,
        message: String,
    },
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(BTreeMap<String, String>),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(resource: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            message: message.into(),
        }
    }

    pub fn already_exists(resource: &'static str, message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource,
            message: message.into(),
        }
    }

    pub fn invalid_argument(resource: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            resource,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            AppError::TokenInvalid(_) => StatusCode::FORBIDDEN,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AlreadyExists { .. } => StatusCode::CONFLICT,
            AppError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn described(code: impl Into<String>, description: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        code: code.into(),
        message: None,
        description: Some(description.into()),
        errors: None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::TokenExpired(message) => ErrorResponse {
                code: TOKEN_EXPIRED_CODE.into(),
                message: Some(message),
                description: None,
                errors: None,
            },
            AppError::TokenInvalid(detail) => described(TOKEN_INVALID_CODE, detail),
            AppError::Unauthenticated => described(
                UNAUTHENTICATED_CODE,
                "User must authenticate in order to access this endpoint",
            ),
            AppError::AccessDenied => described(
                ACCESS_DENIED_CODE,
                "User is not authorized to access this endpoint",
            ),
            AppError::InvalidCredentials => {
                described("InvalidCredentials", "Username or password is incorrect")
            }
            AppError::NotFound { resource, message } => {
                described(format!("{resource}NotFound"), message)
            }
            AppError::AlreadyExists { resource, message } => {
                described(format!("{resource}AlreadyExists"), message)
            }
            AppError::InvalidArgument { resource, message } => {
                described(format!("{resource}InvalidArgument"), message)
            }
            AppError::Validation(errors) => ErrorResponse {
                errors: Some(errors),
                ..described("ValidationFailed", "Validation failed")
            },
            AppError::Internal => described("ServerError", "internal server error"),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::already_exists("Resource", "resource already exists"),
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "database error");
                AppError::Internal
            }
            RepoError::InvalidValue(detail) => {
                tracing::error!(%detail, "stored value could not be decoded");
                AppError::Internal
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired { expired_at } => AppError::TokenExpired(format!(
                "JWT expired at {}",
                expired_at.format("%Y-%m-%dT%H:%M:%SZ")
            )),
            // Malformed and bad-signature tokens share one message on the wire.
            TokenError::Malformed(_) | TokenError::SignatureInvalid => {
                AppError::TokenInvalid("The provided token could not be verified".into())
            }
            TokenError::Signing => AppError::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn expired_token_uses_message_field() {
        let expired_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let (status, body) = render(TokenError::Expired { expired_at }.into()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            json!({ "code": "Token is expired", "message": "JWT expired at 2024-05-01T12:00:00Z" })
        );
    }

    #[tokio::test]
    async fn malformed_and_bad_signature_render_identically() {
        let (s1, b1) = render(TokenError::SignatureInvalid.into()).await;
        let (s2, b2) = render(TokenError::Malformed("three segments".into()).into()).await;

        assert_eq!(s1, StatusCode::FORBIDDEN);
        assert_eq!(s1, s2);
        assert_eq!(b1, b2);
        assert_eq!(b1["code"], "Token is invalid");
        assert!(b1.get("description").is_some());
    }

    #[tokio::test]
    async fn domain_codes_are_resource_prefixed() {
        let (status, body) = render(AppError::not_found("Traveller", "Traveller not found")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "code": "TravellerNotFound", "description": "Traveller not found" })
        );

        let (status, body) = render(AppError::already_exists("User", "taken")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "UserAlreadyExists");
    }

    #[tokio::test]
    async fn validation_lists_every_field() {
        let mut errors = BTreeMap::new();
        errors.insert("user.username".to_string(), "must be an email".to_string());
        errors.insert("personalInfo.phone".to_string(), "must not be empty".to_string());

        let (status, body) = render(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "ValidationFailed");
        assert_eq!(body["errors"]["user.username"], "must be an email");
        assert_eq!(body["errors"]["personalInfo.phone"], "must not be empty");
    }

    #[tokio::test]
    async fn internal_errors_hide_detail() {
        let (status, body) = render(RepoError::InvalidValue("role=ROOT".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "code": "ServerError", "description": "internal server error" })
        );
    }

    #[tokio::test]
    async fn policy_rejections_have_fixed_envelopes() {
        let (status, body) = render(AppError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "userNotAuthenticated");

        let (status, body) = render(AppError::AccessDenied).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "userNotAuthorized");
    }
}
