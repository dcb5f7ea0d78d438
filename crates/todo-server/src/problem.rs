//! `application/problem+json` response bodies.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// Problem type URIs.
pub mod types {
    pub const DEFAULT: &str = "https://www.jhipster.tech/problem/problem-with-message";
    pub const CONSTRAINT_VIOLATION: &str = "https://www.jhipster.tech/problem/constraint-violation";
}

/// One failed field constraint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub object_name: String,
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(object_name: &str, field: &str, message: &str) -> Self {
        Self {
            object_name: object_name.into(),
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Problem details body returned for every failed request.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

impl Problem {
    /// A problem for `status` with the standard reason phrase as title and
    /// `error.http.{code}` as message.
    pub fn for_status(status: StatusCode) -> Self {
        Self {
            type_uri: types::DEFAULT.into(),
            title: status.canonical_reason().unwrap_or("Error").into(),
            status: status.as_u16(),
            detail: None,
            message: format!("error.http.{}", status.as_u16()),
            entity_name: None,
            error_key: None,
            params: None,
            field_errors: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(PROBLEM_CONTENT_TYPE),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_status_fills_defaults() {
        let problem = Problem::for_status(StatusCode::NOT_FOUND);
        assert_eq!(problem.title, "Not Found");
        assert_eq!(problem.message, "error.http.404");
        assert_eq!(problem.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_value(Problem::for_status(StatusCode::BAD_REQUEST)).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("type"));
        assert!(!obj.contains_key("entityName"));
        assert!(!obj.contains_key("fieldErrors"));
        assert!(!obj.contains_key("detail"));
    }

    #[test]
    fn response_uses_problem_content_type() {
        let response = Problem::for_status(StatusCode::INTERNAL_SERVER_ERROR).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            PROBLEM_CONTENT_TYPE
        );
    }
}
