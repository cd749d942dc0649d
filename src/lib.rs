//! Minimal status service for a managed container platform
//!
//! Serves a welcome message plus liveness and readiness probes. A
//! termination signal flips the shutdown flag so the liveness probe
//! reports unhealthy while the server drains.

pub mod config;
pub mod server;
