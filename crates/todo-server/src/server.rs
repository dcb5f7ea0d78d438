use std::sync::Arc;

use tokio::net::TcpListener;

use todo_store::{InMemoryItemStore, ItemStore, LogItemStore};

use crate::config::{ServerConfig, StorageConfig};
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::{AppState, SharedState};

/// Open the store described by `storage`.
pub fn open_store(storage: &StorageConfig) -> ServerResult<Arc<dyn ItemStore>> {
    match &storage.data_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using record log store");
            Ok(Arc::new(LogItemStore::open(path, storage.sync_mode)?))
        }
        None => {
            tracing::warn!("no data_path configured; items are kept in memory only");
            Ok(Arc::new(InMemoryItemStore::new()))
        }
    }
}

/// Todo HTTP server.
pub struct TodoServer {
    config: ServerConfig,
    state: SharedState,
}

impl TodoServer {
    /// Build a server over the store named in `config.storage`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = open_store(&config.storage)?;
        Self::with_store(config, store)
    }

    /// Build a server over an already constructed store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn ItemStore>) -> ServerResult<Self> {
        config.validate()?;
        let state = Arc::new(AppState::new(&config, store)?);
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), &self.config.cors)
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            "todo server listening on {} (application {})",
            self.config.bind_addr,
            self.config.application_name
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
