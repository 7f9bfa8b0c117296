//! REST API for on-demand predictions.
//!
//! Provides two endpoints plus a static-file fallback:
//! - `POST /predict` — weather fetch, feature build, model score, advice
//! - `GET /healthz` — liveness probe
//!
//! Any other path is served from the configured static directory.

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::predict::PredictionService;
use crate::weather::gateway::WeatherGateway;
use crate::weather::timezone::TimezoneResolver;

/// Immutable application state shared across all request handlers.
///
/// Constructed once at startup and wrapped in `Arc` — the artifact never
/// changes while serving, so no locks are needed.
pub struct AppState {
    /// Scoring pipeline around the loaded artifact.
    pub service: PredictionService,
    /// Source of current weather conditions.
    pub gateway: Arc<dyn WeatherGateway>,
    /// Coordinate-to-zone resolution.
    pub resolver: Arc<dyn TimezoneResolver>,
    /// Directory served for any non-API path.
    pub static_dir: PathBuf,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.static_dir.clone();
    Router::new()
        .route("/predict", post(handlers::post_predict))
        .route("/healthz", get(handlers::get_healthz))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}
