//! Builds the shared `TokenService` from `Config`.
use std::sync::Arc;

use tracing::error;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::TokenService;

pub fn build_token_service(config: &Config) -> Result<Arc<TokenService>, AppError> {
    let tokens = TokenService::new(
        &config.jwt_secret,
        &config.jwt_issuer,
        config.access_token_ttl_seconds,
    )
    .map_err(|e| {
        error!(error = %e, "failed to build token service");
        AppError::Internal
    })?;

    Ok(Arc::new(tokens))
}
