//! Error types for the visage library.
//!
//! All fallible operations return [`Result`], and every failure is reported
//! as a value. A corrupt or inconsistent database file surfaces as
//! [`VisageError::Corrupt`], which callers are expected to treat as "no
//! prior database" rather than as a fatal condition.

use std::io;

use thiserror::Error;

/// The main error type for visage operations.
#[derive(Error, Debug)]
pub enum VisageError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An embedding's dimension disagrees with the store's established dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A caller-supplied value is out of range or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// A persisted database file is structurally or internally inconsistent.
    #[error("Corrupt database: {0}")]
    Corrupt(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error, used by external embedder implementations.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with VisageError.
pub type Result<T> = std::result::Result<T, VisageError>;

impl VisageError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        VisageError::InvalidArgument(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        VisageError::Index(msg.into())
    }

    /// Create a new corrupt database error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        VisageError::Corrupt(msg.into())
    }

    /// Create a new dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        VisageError::DimensionMismatch { expected, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = VisageError::index("Test index error");
        assert_eq!(error.to_string(), "Index error: Test index error");

        let error = VisageError::corrupt("bad magic");
        assert_eq!(error.to_string(), "Corrupt database: bad magic");

        let error = VisageError::dimension_mismatch(128, 64);
        assert_eq!(
            error.to_string(),
            "Dimension mismatch: expected 128, got 64"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let visage_error = VisageError::from(io_error);

        match visage_error {
            VisageError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
