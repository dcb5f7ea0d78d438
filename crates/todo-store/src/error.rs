use std::path::PathBuf;

/// Errors from item store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Serialization or deserialization of a log record failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A log entry could not be decoded even though its checksum matched.
    #[error("corrupt log entry at offset {offset}: {reason}")]
    CorruptEntry { offset: u64, reason: String },

    /// Every identifier has been handed out or stored explicitly.
    #[error("item id space exhausted")]
    IdSpaceExhausted,

    /// The record log is held by another open store.
    #[error("could not lock record log {}: {source}", path.display())]
    Locked {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A failed append could not be rolled back; the log refuses writes
    /// until it is reopened.
    #[error("record log unusable until reopened: {0}")]
    LogUnusable(String),

    /// Another thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
