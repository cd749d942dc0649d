//! Tests for the status endpoints

use super::*;
use crate::config::Config;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Running test server plus the handles needed to drive it
struct TestServer {
    addr: SocketAddr,
    state: AppState,
    controller: ShutdownController,
    handle: JoinHandle<Result<(), std::io::Error>>,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a server on an ephemeral port
    ///
    /// The listener is bound before the task is spawned, so requests
    /// queue in the backlog instead of racing the server start.
    async fn start(config: Config) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let state = AppState::new(config, ShutdownState::new());
        let (controller, signal) = shutdown_channel();
        let handle = tokio::spawn(serve(listener, state.clone(), signal));

        Self {
            addr,
            state,
            controller,
            handle,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(format!("http://{}{}", self.addr, path))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .expect("Failed to connect to status server");

        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn staging_config() -> Config {
    Config {
        environment: "staging".to_string(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_health_returns_200_before_shutdown() {
    let server = TestServer::start(Config::default()).await;

    let (status, body) = server.get("/health").await;

    assert_eq!(status, 200, "Liveness probe should return 200");
    assert_eq!(
        body,
        json!({
            "status": "healthy",
            "environment": "production",
            "version": "1.0.0",
            "service": SERVICE_NAME,
        })
    );
}

#[tokio::test]
async fn test_health_returns_503_after_shutdown_begins() {
    let server = TestServer::start(Config::default()).await;

    server.state.shutdown().begin_shutdown();
    let (status, body) = server.get("/health").await;

    assert_eq!(status, 503, "Liveness probe should fail while shutting down");
    assert_eq!(
        body,
        json!({
            "status": "unhealthy",
            "message": "Service is shutting down",
        })
    );
}

#[tokio::test]
async fn test_health_flips_between_requests() {
    let server = TestServer::start(Config::default()).await;

    let (before, _) = server.get("/health").await;
    server.state.shutdown().begin_shutdown();
    let (after, _) = server.get("/health").await;
    let (again, _) = server.get("/health").await;

    assert_eq!(before, 200);
    assert_eq!(after, 503);
    assert_eq!(again, 503, "Flag must stay set once shutdown began");
}

#[tokio::test]
async fn test_root_returns_welcome_message() {
    let server = TestServer::start(Config::default()).await;

    let (status, body) = server.get("/").await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "message": "Welcome to your FastAPI app on Google Cloud Run! This is a test.",
            "environment": "production",
            "version": "1.0.0",
        })
    );
}

#[tokio::test]
async fn test_root_still_served_during_shutdown() {
    let server = TestServer::start(Config::default()).await;
    server.state.shutdown().begin_shutdown();

    let (status, body) = server.get("/").await;

    assert_eq!(status, 200);
    assert_eq!(body["message"], WELCOME_MESSAGE);
}

#[tokio::test]
async fn test_ready_returns_200() {
    let server = TestServer::start(Config::default()).await;

    let (status, body) = server.get("/ready").await;

    assert_eq!(status, 200, "Readiness probe should return 200");
    assert_eq!(
        body,
        json!({
            "status": "ready",
            "environment": "production",
            "version": "1.0.0",
        })
    );
}

#[tokio::test]
async fn test_ready_ignores_shutdown_flag() {
    let server = TestServer::start(Config::default()).await;
    server.state.shutdown().begin_shutdown();

    let (status, body) = server.get("/ready").await;

    assert_eq!(status, 200, "Readiness does not consult the shutdown flag");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_all_endpoints_report_staging_environment() {
    let server = TestServer::start(staging_config()).await;

    for path in ["/", "/health", "/ready"] {
        let (status, body) = server.get(path).await;
        assert_eq!(status, 200, "{} should return 200", path);
        assert_eq!(body["environment"], "staging", "{} environment", path);
        assert_eq!(body["version"], "1.0.0", "{} version", path);
    }
}

#[tokio::test]
async fn test_custom_version_reported() {
    let config = Config {
        version: "2.4.0".to_string(),
        ..Config::default()
    };
    let server = TestServer::start(config).await;

    let (_, body) = server.get("/health").await;
    assert_eq!(body["version"], "2.4.0");
}

#[tokio::test]
async fn test_unknown_path_returns_404() {
    let server = TestServer::start(Config::default()).await;

    let (status, _) = server.get("/metrics").await;

    assert_eq!(status, 404);
}

#[tokio::test]
async fn test_server_stops_on_shutdown_signal() {
    let mut server = TestServer::start(Config::default()).await;

    // Serve one request so the server is definitely running
    let (status, _) = server.get("/health").await;
    assert_eq!(status, 200);

    server.controller.shutdown();

    let result = tokio::time::timeout(Duration::from_secs(5), &mut server.handle)
        .await
        .expect("Server should stop after shutdown signal")
        .expect("Server task panicked");
    assert!(result.is_ok(), "Graceful shutdown should not error");
}

#[tokio::test]
async fn test_app_state_clones_share_flag() {
    let state = AppState::new(staging_config(), ShutdownState::new());
    let cloned = state.clone();

    assert_eq!(cloned.config().environment, "staging");
    assert!(!cloned.shutdown().is_shutting_down());

    state.shutdown().begin_shutdown();
    assert!(cloned.shutdown().is_shutting_down());
}
