//! Structured error types for task operations and storage.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    EmptyName,
    InvalidFieldValue,

    // Not found errors
    TaskNotFound,

    // Internal errors
    StorageError,
    InternalError,
}

/// Structured error for task operations.
#[derive(Debug, Serialize)]
pub struct TodoError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl TodoError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn empty_name() -> Self {
        Self::new(ErrorCode::EmptyName, "Task name must not be empty").with_field("name")
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn task_not_found(id: impl fmt::Display) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Task not found: {}", id))
    }

    pub fn storage(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::StorageError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }

    /// True for input rejections that leave state untouched.
    pub fn is_rejection(&self) -> bool {
        matches!(self.code, ErrorCode::EmptyName)
    }
}

impl fmt::Display for TodoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TodoError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for TodoError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<TodoError>() {
            Ok(todo_err) => todo_err,
            Err(err) => match err.downcast::<StorageError>() {
                Ok(storage_err) => TodoError::storage(storage_err),
                Err(err) => TodoError::internal(err),
            },
        }
    }
}

impl From<StorageError> for TodoError {
    fn from(err: StorageError) -> Self {
        TodoError::storage(err)
    }
}

/// Result type for task operations.
pub type TodoResult<T> = std::result::Result<T, TodoError>;

/// Failures raised by key-value backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] refinery::Error),

    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned")]
    Poisoned,
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
