//! HTTP server for the status endpoints
//!
//! Provides the container platform's probes:
//! - `/health` - Liveness probe (fails once shutdown has begun)
//! - `/ready` - Readiness probe
//!
//! Also provides graceful shutdown handling for SIGTERM/SIGINT.

mod health;
pub mod shutdown;

pub use health::{
    build_router, run_server, serve, AppState, SERVICE_NAME, SHUTTING_DOWN_MESSAGE,
    WELCOME_MESSAGE,
};
pub use shutdown::{
    handle_termination, shutdown_channel, ShutdownController, ShutdownSignal, ShutdownState,
    TerminationSignals,
};

#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
