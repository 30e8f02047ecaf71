//! Bearer token → `Principal` in the request extensions.
//!
//! No credential means anonymous; route protection is the policy layer's job.
//! A credential that fails validation ends the request here.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::services::auth::Principal;
use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, authentication_gate))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned)
}

async fn authentication_gate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if req.extensions().get::<Principal>().is_some() {
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(req.headers()) else {
        return Ok(next.run(req).await);
    };

    let claims = match state.tokens.validate(&token) {
        Ok(claims) => claims,
        Err(err) => {
            warn!(error = ?err, path = %req.uri().path(), "access token rejected");
            return Err(err.into());
        }
    };

    let principal = match state.principals.find_principal(&claims.sub).await {
        Ok(Some(principal)) => principal,
        Ok(None) => {
            warn!(subject = %claims.sub, "token subject no longer exists");
            return Err(AppError::TokenInvalid(
                "The provided token could not be verified".into(),
            ));
        }
        Err(err) => {
            warn!(error = ?err, subject = %claims.sub, "principal lookup failed");
            return Err(AppError::TokenInvalid(
                "The provided token could not be verified".into(),
            ));
        }
    };

    debug!(subject = %principal.subject, role = %principal.role, "request authenticated");
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
