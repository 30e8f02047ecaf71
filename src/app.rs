/*
 * Responsibility
 * - Config → dependencies → Router
 * - middleware order (outermost first): security headers, CORS, HTTP stack,
 *   authentication gate, authorization policy, handlers
 * - axum::serve()
 */
use std::{panic, process};

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repos::Storage;
use crate::services::auth::{PasswordHasher, build_token_service};
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,country_tracker=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development fails fast; production keeps serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "database pool ready"
    );

    let tokens = build_token_service(config)?;
    let hasher = PasswordHasher::new(config.bcrypt_cost);
    tracing::info!(
        issuer = tokens.issuer(),
        ttl_seconds = tokens.ttl().num_seconds(),
        bcrypt_cost = hasher.cost(),
        "auth services ready"
    );

    Ok(AppState::new(tokens, hasher, Storage::postgres(pool)))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new().nest("/api/v1", api::v1::routes());

    // layers added later run earlier: the gate must see the request before the policy
    let router = middleware::auth::policy::apply(router, state.clone());
    let router = middleware::auth::access::apply(router, state.clone());
    let router = router.with_state(state);

    let router = middleware::http::apply(router);
    let router = middleware::cors::apply(router, config);
    middleware::security_headers::apply(router)
}
