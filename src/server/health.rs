//! Status endpoints for the container platform
//!
//! - `/` - Welcome message with environment and version
//! - `/health` - Liveness: 200 while serving, 503 once shutdown has begun
//! - `/ready` - Readiness: always 200

use crate::config::Config;
use crate::server::shutdown::{ShutdownSignal, ShutdownState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// Service identifier reported by `/health`
pub const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");

/// Fixed message returned by `/`
pub const WELCOME_MESSAGE: &str =
    "Welcome to your FastAPI app on Google Cloud Run! This is a test.";

/// Message returned by `/health` while shutting down
pub const SHUTTING_DOWN_MESSAGE: &str = "Service is shutting down";

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    shutdown: ShutdownState,
}

impl AppState {
    pub fn new(config: Config, shutdown: ShutdownState) -> Self {
        Self {
            config: Arc::new(config),
            shutdown,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown(&self) -> &ShutdownState {
        &self.shutdown
    }
}

#[derive(Debug, Serialize)]
struct WelcomeResponse {
    message: &'static str,
    environment: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct HealthyResponse {
    status: &'static str,
    environment: String,
    version: String,
    service: &'static str,
}

#[derive(Debug, Serialize)]
struct UnhealthyResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    environment: String,
    version: String,
}

async fn root(State(state): State<AppState>) -> Json<WelcomeResponse> {
    info!("Root endpoint accessed");
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE,
        environment: state.config.environment.clone(),
        version: state.config.version.clone(),
    })
}

/// Liveness probe handler
///
/// Returns 503 once the shutdown flag is set so the platform stops routing
/// traffic here before the process exits.
async fn health(State(state): State<AppState>) -> Response {
    if state.shutdown.is_shutting_down() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(UnhealthyResponse {
                status: "unhealthy",
                message: SHUTTING_DOWN_MESSAGE,
            }),
        )
            .into_response();
    }

    Json(HealthyResponse {
        status: "healthy",
        environment: state.config.environment.clone(),
        version: state.config.version.clone(),
        service: SERVICE_NAME,
    })
    .into_response()
}

/// Readiness probe handler
///
/// No dependency checks; reports ready for as long as the process serves.
async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        status: "ready",
        environment: state.config.environment.clone(),
        version: state.config.version.clone(),
    })
}

/// Build the router for the status endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .layer(
            // Access log at info so it shows under the default filter
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Serve the status endpoints on an already bound listener
///
/// Returns once `shutdown` fires and in-flight requests have completed.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    mut shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let app = build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}

/// Bind `0.0.0.0:port` and serve the status endpoints until `shutdown` fires
pub async fn run_server(
    port: u16,
    state: AppState,
    shutdown: ShutdownSignal,
) -> Result<(), std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    // Log after successful bind - server is actually listening
    info!(port = %port, "Status server listening (HTTP)");

    serve(listener, state, shutdown).await
}
