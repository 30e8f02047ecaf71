/*
 * Responsibility
 * - POST /auth/authenticate: credentials in, access token out
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{
        dto::auth::{AuthenticationRequest, AuthenticationResponse},
        extractors::JsonBody,
    },
    error::AppError,
    state::AppState,
};

pub async fn authenticate(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AuthenticationRequest>,
) -> Result<Json<AuthenticationResponse>, AppError> {
    req.validate()?;

    let user = state
        .authentication
        .authenticate(req.username.trim(), &req.password)
        .await?;

    Ok(Json(user.into()))
}
