/// Result type alias for record operations
pub type Result<T> = std::result::Result<T, RecordError>;

/// Failure kinds surfaced by the store, the consistency engine and imports.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    DuplicateKey(String),

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable code used in the IPC error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::Validation(_) => "validation_failed",
            Self::Store(_) => "db_failed",
            Self::Io(_) => "io_failed",
        }
    }
}
