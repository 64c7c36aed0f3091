//! Process-wide shutdown signal
//!
//! One `CancellationToken` is handed to every component at construction.
//! SIGINT and SIGTERM cancel it; so does the crawl itself when it runs out
//! of work or the persistence stage fails.

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn trigger(&self) {
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels the token on the first SIGINT or SIGTERM
    ///
    /// Returns when a signal arrived or the token was cancelled some other
    /// way, whichever happens first.
    pub async fn listen_for_signals(self) {
        tokio::select! {
            _ = wait_for_signal() => {
                tracing::info!("Shutdown signal received, draining");
                self.trigger();
            }
            _ = self.token.cancelled() => {}
        }
    }

    /// Spawns `listen_for_signals` as a background task
    pub fn install_signal_handlers(&self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.clone().listen_for_signals())
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Cannot listen for SIGTERM: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for SIGINT: {}", e);
                std::future::pending::<()>().await;
            }
            return;
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!("Cannot listen for SIGINT: {}", e);
                terminate.recv().await;
            }
        }
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
