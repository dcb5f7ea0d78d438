use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use todo_store::StoreError;

use crate::problem::{types, FieldError, Problem};

/// Errors raised while configuring or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// The three outward failure categories of the item API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client-supplied data violates a precondition. Never retried.
    Validation,
    /// Lookup by id found no record.
    NotFound,
    /// The store, or the worker running it, failed underneath the request.
    Store,
}

/// Errors produced while handling an item request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A business rule on the payload failed (`idexists`, `idnull`).
    #[error("{message}")]
    BadRequestAlert {
        message: String,
        entity_name: &'static str,
        error_key: &'static str,
    },

    /// One or more field constraints failed.
    #[error("method argument not valid: {}", summarize(.field_errors))]
    FieldValidation { field_errors: Vec<FieldError> },

    /// The request could not be read (body, path, or query).
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("resource not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The blocking task running a store call panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}.{}: {}", e.object_name, e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApiError {
    pub fn bad_request_alert(
        message: impl Into<String>,
        entity_name: &'static str,
        error_key: &'static str,
    ) -> Self {
        Self::BadRequestAlert {
            message: message.into(),
            entity_name,
            error_key,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequestAlert { .. } | Self::FieldValidation { .. } | Self::BadRequest(_) => {
                ErrorKind::Validation
            }
            Self::NotFound => ErrorKind::NotFound,
            Self::Store(_) | Self::Internal(_) => ErrorKind::Store,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `(entity, key)` pair advertised in alert headers, if any.
    pub fn alert_key(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::BadRequestAlert {
                entity_name,
                error_key,
                ..
            } => Some((*entity_name, *error_key)),
            _ => None,
        }
    }

    pub fn to_problem(&self) -> Problem {
        let base = Problem::for_status(self.status_code());
        match self {
            Self::BadRequestAlert {
                message,
                entity_name,
                error_key,
            } => Problem {
                title: message.clone(),
                message: format!("error.{error_key}"),
                entity_name: Some((*entity_name).into()),
                error_key: Some((*error_key).into()),
                params: Some((*entity_name).into()),
                ..base
            },
            Self::FieldValidation { field_errors } => Problem {
                type_uri: types::CONSTRAINT_VIOLATION.into(),
                title: "Method argument not valid".into(),
                message: "error.validation".into(),
                field_errors: field_errors.clone(),
                ..base
            },
            Self::BadRequest(detail) => base.with_detail(detail.clone()),
            Self::NotFound => base,
            // Store internals stay in the server log.
            Self::Store(_) | Self::Internal(_) => base,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Store(e) => tracing::error!(error = %e, "store failure while handling request"),
            Self::Internal(e) => tracing::error!(error = %e, "internal failure while handling request"),
            _ => {}
        }
        self.to_problem().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_types::ENTITY_NAME;

    #[test]
    fn kinds_map_to_distinct_statuses() {
        let validation = ApiError::bad_request_alert("Invalid id", ENTITY_NAME, "idnull");
        let not_found = ApiError::NotFound;
        let store = ApiError::from(StoreError::LockPoisoned);

        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(store.kind(), ErrorKind::Store);
        assert_eq!(store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn alert_problem_carries_reason_code() {
        let err = ApiError::bad_request_alert(
            "A new items cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        );
        let problem = err.to_problem();
        assert_eq!(problem.status, 400);
        assert_eq!(problem.message, "error.idexists");
        assert_eq!(problem.error_key.as_deref(), Some("idexists"));
        assert_eq!(problem.entity_name.as_deref(), Some("items"));
        assert_eq!(problem.title, "A new items cannot already have an ID");
        assert_eq!(err.alert_key(), Some(("items", "idexists")));
    }

    #[test]
    fn field_problem_lists_errors() {
        let err = ApiError::FieldValidation {
            field_errors: vec![FieldError::new(ENTITY_NAME, "description", "NotNull")],
        };
        let problem = err.to_problem();
        assert_eq!(problem.type_uri, types::CONSTRAINT_VIOLATION);
        assert_eq!(problem.message, "error.validation");
        assert_eq!(problem.field_errors.len(), 1);
        assert!(err.to_string().contains("items.description: NotNull"));
        assert!(err.alert_key().is_none());
    }

    #[test]
    fn exhausted_id_space_is_a_store_failure() {
        let err = ApiError::from(StoreError::IdSpaceExhausted);
        assert_eq!(err.kind(), ErrorKind::Store);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_problem_hides_details() {
        let err = ApiError::Internal("task panicked".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_problem().detail.is_none());
    }

    #[test]
    fn store_problem_hides_details() {
        let err = ApiError::from(StoreError::Serialization("secret".into()));
        let problem = err.to_problem();
        assert_eq!(problem.message, "error.http.500");
        assert!(problem.detail.is_none());
    }
}
