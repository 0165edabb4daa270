pub mod handlers;
pub mod models;
pub mod router;


use crate::errors::StoreError;
use crate::ratelimit::RateLimiter;
use crate::store::ReportStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ReportStore>,
    api_key: Arc<str>,
    store_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn ReportStore>, api_key: &str, store_timeout: Duration) -> Self {
        Self {
            store,
            api_key: Arc::from(api_key),
            store_timeout,
        }
    }

    /// Runs a datastore call, giving up after the configured timeout.
    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.store_timeout, op)
            .await
            .map_err(|_| StoreError::Timeout(self.store_timeout))?
    }
}

pub struct ApiServer {
    state: AppState,
    limiter: Arc<RateLimiter>,
}

impl ApiServer {
    pub fn new(state: AppState, limiter: Arc<RateLimiter>) -> Self {
        Self { state, limiter }
    }

    /// Binds the server to the configured port and serves until Ctrl+C or SIGTERM.
    pub async fn run(self, port: u16) -> anyhow::Result<()> {
        let app = router::build(self.state, self.limiter);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🚀 TravelSafe Hub backend running at http://{}", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down...");
}
