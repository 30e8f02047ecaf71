//! Route authorization, run after the authentication gate.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};
use tracing::warn;

use crate::error::AppError;
use crate::services::auth::{Decision, Principal};
use crate::state::AppState;

/// Must be applied on the router that already contains the `/api/v1` nest,
/// so the full request path is matched against the table.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, authorization_policy))
}

async fn authorization_policy(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let principal = req.extensions().get::<Principal>().cloned();
    let path = req.uri().path().to_owned();

    match state
        .policy
        .evaluate(&path, principal.as_ref(), state.owners.as_ref())
        .await
    {
        Decision::Permit => Ok(next.run(req).await),
        Decision::Deny => match principal {
            None => {
                warn!(%path, "anonymous request to protected route");
                Err(AppError::Unauthenticated)
            }
            Some(p) => {
                warn!(%path, subject = %p.subject, role = %p.role, "access denied");
                Err(AppError::AccessDenied)
            }
        },
    }
}
