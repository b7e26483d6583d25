//! HTTP server setup and routing
//!
//! Sets up the Axum HTTP server with routes for the alert trigger,
//! acknowledgement, and read endpoints.

use crate::engine::AlertEngine;
use crate::history::HistorySink;
use axum::{
    routing::{get, post, put},
    Router,
};
use foodlink_common::Result;
use sqlx::{Pool, Sqlite};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub engine: Arc<AlertEngine>,
    pub db_pool: Pool<Sqlite>,
    pub history: Arc<dyn HistorySink>,
}

/// Build the application router.
///
/// Separate from `run` so integration tests can drive it with oneshot
/// requests.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Alert endpoints
        .route("/api/alerts", get(super::handlers::list_alerts))
        .route("/api/alerts/history", get(super::handlers::list_history))
        .route("/api/alerts/check", post(super::handlers::trigger_expiry_check))
        .route("/api/alerts/:alert_id/acknowledge", put(super::handlers::acknowledge_alert))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Run HTTP API server
pub async fn run(ctx: AppContext, port: u16) -> Result<()> {
    let app = router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
