use thiserror::Error;

/// Errors produced when parsing or constructing foundation types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid item id: {0}")]
    InvalidId(String),

    #[error("unknown sort property: {0}")]
    UnknownProperty(String),

    #[error("unknown sort direction: {0}")]
    UnknownDirection(String),

    #[error("page size must be at least 1")]
    ZeroPageSize,
}
