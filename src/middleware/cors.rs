//! CORS for browser clients.
//!
//! Development allows any origin. Production echoes only origins from
//! `CORS_ALLOWED_ORIGINS`; an empty allowlist allows none. Credentials are
//! never allowed.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

fn allowed_origins(config: &Config) -> AllowOrigin {
    if !config.app_env.is_production() {
        return AllowOrigin::any();
    }

    let origins = config
        .cors_allowed_origins
        .iter()
        .filter(|s| s.as_str() != "*")
        .filter_map(|s| match HeaderValue::from_str(s) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %s, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    AllowOrigin::list(origins)
}

pub fn apply(router: Router, config: &Config) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        CorsLayer::new()
            .allow_origin(allowed_origins(config))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::ACCEPT,
                request_id.clone(),
            ])
            .expose_headers([request_id])
            .max_age(PREFLIGHT_MAX_AGE),
    )
}
