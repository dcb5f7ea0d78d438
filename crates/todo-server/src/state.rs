use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use todo_store::ItemStore;

use crate::alert::Alerts;
use crate::config::{PagingConfig, ServerConfig};
use crate::error::{ApiError, ServerResult};
use crate::service::ItemService;

/// Everything a request handler needs, built once at startup.
#[derive(Debug)]
pub struct AppState {
    pub service: ItemService,
    pub alerts: Alerts,
    pub paging: PagingConfig,
    pub application_name: String,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: &ServerConfig, store: Arc<dyn ItemStore>) -> ServerResult<Self> {
        Ok(Self {
            service: ItemService::new(store),
            alerts: Alerts::new(&config.application_name)?,
            paging: config.paging.clone(),
            application_name: config.application_name.clone(),
        })
    }

    /// Attach failure alert headers (when the error has a reason key).
    pub fn reject(&self, error: ApiError) -> ErrorReply {
        let headers = error
            .alert_key()
            .map(|(entity, key)| self.alerts.failure(entity, key))
            .unwrap_or_default();
        ErrorReply { headers, error }
    }
}

/// A failed request: problem body plus any advisory headers.
#[derive(Debug)]
pub struct ErrorReply {
    headers: HeaderMap,
    error: ApiError,
}

impl ErrorReply {
    pub fn error(&self) -> &ApiError {
        &self.error
    }
}

impl IntoResponse for ErrorReply {
    fn into_response(self) -> Response {
        (self.headers, self.error).into_response()
    }
}
