//! HTTP front door for the review hook.
//!
//! Routes:
//! - `POST /2015-03-31/functions/function/invocations`: runtime-emulator
//!   invocation; replies 200 with the hook response envelope.
//! - `ANY /webhook`: GitLab webhook; the hook response is the HTTP response.
//! - `GET /health`: liveness.

pub mod core;
pub mod error_handler;
pub mod middleware_layer;
pub mod routes;

use std::{env, sync::Arc};

use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use tokio::signal;
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::{
        health_route::health, invocations::invoke_route::invoke, webhook::webhook_route::webhook,
    },
};

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8080";
pub const INVOCATIONS_PATH: &str = "/2015-03-31/functions/function/invocations";

/// Builds the router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(INVOCATIONS_PATH, post(invoke))
        .route("/webhook", any(webhook))
        .route("/health", get(health))
        .layer(middleware::from_fn(
            middleware_layer::request_id::ensure_request_id,
        ))
        .with_state(state)
}

/// Boots from the environment: hook config plus `API_ADDRESS`.
pub async fn start() -> AppResult<()> {
    let state = AppState::from_env()?;
    let addr = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_API_ADDRESS.to_string());
    serve(Arc::new(state), &addr).await
}

/// Serves until Ctrl+C.
pub async fn serve(state: Arc<AppState>, addr: &str) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!(%addr, "review hook listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("review hook stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
