//! HashBucket HTTP Server - health check and hash-bucket prediction API
//!
//! The service is built explicitly: construct an [`AppState`], turn it into a
//! [`Router`] with [`router`], then hand it to [`serve`] or [`run`].

pub mod api;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;
pub mod telemetry;

pub use api::{ErrorResponse, PredictRequest, PredictResponse};
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the application router
pub fn router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Bind to the configured address and serve until Ctrl-C
///
/// Installs the Prometheus recorder, so call at most once per process.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    crate::metrics::init_prometheus()?;
    crate::metrics::init_metrics();

    let addr = config.socket_addr()?;
    let state = AppState::new(config);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    serve(listener, app, shutdown_signal()).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal, shutting down gracefully..."),
        Err(e) => {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
