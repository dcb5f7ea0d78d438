use serde::{Deserialize, Serialize};

/// HTTP endpoint paths served by the todo server.
pub mod endpoints {
    pub const ITEMS: &str = "/api/items";
    pub const ITEM: &str = "/api/items/:id";
    pub const HEALTH: &str = "/management/health";
    pub const INFO: &str = "/management/info";
}

/// Location of a single item resource.
pub fn item_location(id: impl std::fmt::Display) -> String {
    format!("{}/{id}", endpoints::ITEMS)
}

/// Health check response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "UP".into(),
            error: None,
        }
    }

    pub fn down(error: impl Into<String>) -> Self {
        Self {
            status: "DOWN".into(),
            error: Some(error.into()),
        }
    }
}
