use thiserror::Error;

/// Main error type for the Rusty Field library.
/// Aggregates errors from dependencies and internal modules.
#[derive(Error, Debug)]
pub enum RustyFieldError {
    #[error("{0}")]
    WithContextError(String),

    // Third-party library errors
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Cursor module errors
    #[error("{0}")]
    CursorError(#[from] crate::cursor::CursorError),

    // Table module errors
    #[error("{0}")]
    TableError(#[from] crate::table::TableError),

    // Field module errors
    #[error("{0}")]
    FieldError(#[from] crate::field::FieldError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyFieldError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyFieldError::WithContextError(format!("{}: {}", message, e)))
    }
}
