//! HTTP server for the todo service.
//!
//! Exposes the item collection as a REST resource under `/api/items` and
//! management endpoints under `/management`. Request handling is split in
//! two: [`ItemService`] applies the validation rules and talks to the store,
//! and the axum handlers translate between HTTP and the service, mapping
//! every [`ApiError`] to a status code and problem body at the boundary.

pub mod alert;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod pagination;
pub mod problem;
pub mod router;
pub mod server;
pub mod service;
pub mod state;

pub use alert::Alerts;
pub use config::{CorsConfig, PagingConfig, ServerConfig, StorageConfig};
pub use endpoint::{endpoints, HealthResponse};
pub use error::{ApiError, ApiResult, ErrorKind, ServerError, ServerResult};
pub use problem::{FieldError, Problem};
pub use server::{open_store, TodoServer};
pub use service::{ItemPayload, ItemService};
pub use state::{AppState, SharedState};
