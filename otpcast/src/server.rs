//! Server orchestration
//!
//! Manages the startup and shutdown of all components: the HTTP API, the
//! OTP monitor and the sent-history retention sweep.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{error, info};

use otpcast_core::monitor::{run_history_prune, OtpMonitor};
use otpcast_core::repository::SentHistoryRepository;
use otpcast_core::service::{CommandService, SessionService};
use otpcast_core::transport::ChatTransport;
use otpcast_core::Config;

/// Everything the server needs, built in `main`.
pub struct Services {
    pub session_service: Arc<SessionService>,
    pub command_service: Arc<CommandService>,
    pub transport: Arc<dyn ChatTransport>,
    pub history: SentHistoryRepository,
    pub monitor: OtpMonitor,
}

pub struct OtpcastServer {
    config: Config,
    services: Services,
}

impl OtpcastServer {
    #[must_use]
    pub const fn new(config: Config, services: Services) -> Self {
        Self { config, services }
    }

    /// Start all components and wait for a shutdown signal.
    pub async fn start(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Background tasks
        let monitor_handle = tokio::spawn(self.services.monitor.run(shutdown_rx.clone()));
        tokio::spawn(run_history_prune(
            self.services.history.clone(),
            self.config.monitor.history_retention_days,
            shutdown_rx.clone(),
        ));

        // HTTP server
        let router = otpcast_api::create_router(
            Arc::clone(&self.services.session_service),
            Arc::clone(&self.services.command_service),
            Arc::clone(&self.services.transport),
        );
        let addr = self.config.http_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("HTTP server listening on {addr}");

        let mut http_shutdown = shutdown_rx.clone();
        let http_handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = http_shutdown.changed().await;
                })
                .await
        });

        info!("All components started");

        // Wait for a component to stop or a shutdown signal
        tokio::select! {
            result = http_handle => {
                error!("HTTP server stopped unexpectedly: {result:?}");
            }
            _ = monitor_handle => {
                error!("OTP monitor stopped unexpectedly");
            }
            () = shutdown_signal() => {
                info!("Shutdown signal received, starting graceful shutdown...");
            }
        }

        // Signal all components to shut down
        let _ = shutdown_tx.send(true);

        // Take sessions offline without dropping their stored credentials
        self.services.session_service.disconnect_all().await;
        info!("Shutdown complete");

        Ok(())
    }
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C signal"),
            Err(e) => error!("Failed to install Ctrl+C handler: {e}"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                info!("Received SIGTERM signal");
            }
            Err(e) => error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
