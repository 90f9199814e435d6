//! HTTP surface over the recommendation engine.

mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

pub use crate::core::app_state::AppState;
use crate::{
    error_handler::AppError,
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        activity::record_activity_route::record_activity_route,
        health_route::health_route,
        recommendations::{
            home_feed_route::home_feed_route, recommendations_route::recommendations_route,
        },
        similar_products::similar_products_route::similar_products_route,
    },
};

/// Build the router with every route and the JSON error middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_route))
        .route("/recommendations/{user_id}", get(recommendations_route))
        .route("/recommendations/{user_id}/home", get(home_feed_route))
        .route("/products/{product_id}/similar", get(similar_products_route))
        .route("/activity", post(record_activity_route))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Serve until Ctrl+C, then drain in-flight requests.
///
/// # Errors
/// `Bind` when the address is unavailable, `Server` on an accept-loop failure.
pub async fn start(state: AppState, address: &str) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|source| AppError::Bind {
            address: address.to_string(),
            source,
        })?;

    info!(target: "api::server", %address, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!(target: "api::server", "server drained");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(target: "api::server", error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target: "api::server", "shutdown signal received");
}
