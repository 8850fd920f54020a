use nudge_core::TaskId;
use thiserror::Error;

/// User-input problems. The `Display` text is exactly what the user is shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task and time must not be empty")]
    EmptyInput,

    #[error("reminder time is invalid")]
    InvalidTime,

    #[error("reminder time must be in the future")]
    NotInFuture,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task not found: {id}")]
    NotFound { id: TaskId },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, TaskError>;
