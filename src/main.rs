use status_service::config::Config;
use status_service::server::{
    handle_termination, run_server, shutdown_channel, AppState, ShutdownState,
    TerminationSignals,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let port = config.port;
    info!(
        environment = %config.environment,
        version = %config.version,
        port = port,
        "Starting status service"
    );

    // Register before serving so an early SIGTERM still flips the flag
    let mut signals = TerminationSignals::register()?;

    let (shutdown_controller, shutdown_signal) = shutdown_channel();
    let shutdown_state = ShutdownState::new();
    let state = AppState::new(config, shutdown_state.clone());

    let mut server = tokio::spawn(run_server(port, state, shutdown_signal));

    tokio::select! {
        result = &mut server => {
            result??;
            warn!("Status server stopped before a termination signal");
            return Ok(());
        }
        received = handle_termination(signals.recv(), shutdown_state, shutdown_controller) => {
            let signal = received?;
            info!(signal = signal, "Waiting for in-flight requests to finish");
        }
    }

    server.await??;

    info!("Shutting down status service");
    Ok(())
}
