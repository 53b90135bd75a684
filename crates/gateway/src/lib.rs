//! Keep-alive HTTP surface for Ironwren.
//!
//! Hosting platforms decide a bot is dead when nothing answers HTTP, so a
//! small Axum service runs alongside the assistant. `/health` reports
//! status, version, and uptime for probes; `/` answers with a plain banner.

use std::sync::Arc;
use std::time::Instant;

use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use ironwren_config::GatewaySettings;

/// Shared gateway state.
pub struct GatewayState {
    started_at: Instant,
}

impl GatewayState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for GatewayState {
    fn default() -> Self {
        Self::new()
    }
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with the gateway routes.
pub fn build_router(state: SharedState) -> Router {
    // Status dashboards poll /health from the browser, cross-origin.
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server. Runs until the process exits.
pub async fn start(settings: &GatewaySettings) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let app = build_router(Arc::new(GatewayState::new()));

    info!(addr = %addr, "Gateway listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_secs(),
    })
}

async fn root_handler() -> &'static str {
    "Ironwren is awake."
}
