//! Shutdown handling for the status service
//!
//! On SIGTERM or SIGINT the service:
//! - Sets the shutdown flag so `/health` starts returning 503
//! - Fires the shutdown channel so the HTTP server stops gracefully
//!
//! Nothing else happens in the signal path; request draining is left to
//! the server's own graceful shutdown.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Process-wide "termination requested" flag
///
/// Starts `false` and can only ever move to `true`. Clones share the
/// same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownState {
    shutting_down: Arc<AtomicBool>,
}

impl ShutdownState {
    /// Create a new flag (not shutting down)
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as shutting down
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// flag was already set.
    pub fn begin_shutdown(&self) -> bool {
        !self.shutting_down.swap(true, Ordering::SeqCst)
    }

    /// Check if shutdown has begun
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }
}

/// Shutdown signal sender/receiver pair
///
/// The sender is used to trigger shutdown, the receiver is used to wait for it.
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait for shutdown signal
    pub async fn wait(&mut self) {
        while !*self.receiver.borrow() {
            if self.receiver.changed().await.is_err() {
                // Sender dropped, treat as shutdown
                break;
            }
        }
    }

    /// Check if shutdown was signaled (non-blocking)
    #[cfg(test)]
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Controller for triggering shutdown
pub struct ShutdownController {
    sender: watch::Sender<bool>,
}

impl ShutdownController {
    /// Trigger shutdown
    pub fn shutdown(&self) {
        let _ = self.sender.send(true);
        info!("Shutdown signal sent");
    }
}

/// Create a new shutdown signal pair
///
/// Returns (controller, signal) where:
/// - controller: Used to trigger shutdown
/// - signal: Cloned and passed to components that need to listen
pub fn shutdown_channel() -> (ShutdownController, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownController { sender }, ShutdownSignal { receiver })
}

/// Registered SIGTERM and SIGINT handlers
///
/// Register early in startup so a signal arriving while the server binds
/// is not lost.
#[cfg(unix)]
pub struct TerminationSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    /// Install the signal handlers
    pub fn register() -> Result<Self, std::io::Error> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the next SIGTERM or SIGINT
    ///
    /// Returns the name of the signal that was received.
    pub async fn recv(&mut self) -> Result<&'static str, std::io::Error> {
        tokio::select! {
            _ = self.sigterm.recv() => Ok("SIGTERM"),
            _ = self.sigint.recv() => Ok("SIGINT"),
        }
    }
}

/// Ctrl+C handler (Windows)
#[cfg(not(unix))]
pub struct TerminationSignals {
    _private: (),
}

#[cfg(not(unix))]
impl TerminationSignals {
    pub fn register() -> Result<Self, std::io::Error> {
        Ok(Self { _private: () })
    }

    pub async fn recv(&mut self) -> Result<&'static str, std::io::Error> {
        tokio::signal::ctrl_c().await?;
        Ok("CTRL_C")
    }
}

/// Wait for a shutdown notification, then flip the flag and fire the channel
///
/// `notification` is normally `TerminationSignals::recv`. If it fails the
/// flag is left untouched and the error is returned; `controller` is
/// dropped, which listeners also treat as shutdown.
pub async fn handle_termination<F>(
    notification: F,
    state: ShutdownState,
    controller: ShutdownController,
) -> Result<&'static str, std::io::Error>
where
    F: Future<Output = Result<&'static str, std::io::Error>>,
{
    let signal = notification.await?;

    state.begin_shutdown();
    info!(signal = signal, "Received termination signal, reporting unhealthy");

    controller.shutdown();
    Ok(signal)
}
