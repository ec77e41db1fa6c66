//! Error types for recipebox.
//!
//! This module defines all error types used throughout the recipebox crate.
//! Caller-facing rejections (validation, ownership, not-found) are ordinary
//! values that request handlers turn into responses; storage errors are fatal
//! at startup; schema errors are recovered from while a store is opened.

use std::path::PathBuf;
use thiserror::Error;

pub use crate::storage::schema::SchemaError;

/// The main error type for recipebox operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Caller-facing Errors ===
    /// Malformed or missing input, duplicate explicit id, or empty title.
    #[error("invalid input: {reason}")]
    Validation {
        /// Human-readable reason the input was rejected.
        reason: String,
    },

    /// A mutation was attempted by someone other than the record owner.
    #[error("record {id} does not belong to {requester}")]
    Ownership {
        /// Id of the record that was targeted.
        id: i64,
        /// Name of the requester that was refused.
        requester: String,
    },

    /// The targeted record does not exist.
    #[error("there is no record with id {id}")]
    NotFound {
        /// Id that was looked up.
        id: i64,
    },

    // === Storage Errors ===
    /// The document could not be read.
    #[error("failed to read document at {path}: {source}")]
    DocumentRead {
        /// Path to the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The document could not be written.
    #[error("failed to write document at {path}: {source}")]
    DocumentWrite {
        /// Path to the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The in-memory collection could not be encoded as YAML.
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_yaml::Error),

    /// The document content does not satisfy the collection schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A store lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for recipebox operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected input.
    Validation,
    /// Requester does not own the record.
    Ownership,
    /// Record does not exist.
    NotFound,
    /// The document could not be read or written.
    Storage,
    /// The document content is structurally invalid.
    Schema,
    /// Configuration could not be loaded or is invalid.
    Config,
    /// Bug or poisoned state.
    Internal,
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Ownership { .. } => ErrorKind::Ownership,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DocumentRead { .. }
            | Self::DocumentWrite { .. }
            | Self::DirectoryCreate { .. }
            | Self::Encode(_)
            | Self::Io(_) => ErrorKind::Storage,
            Self::Schema(_) => ErrorKind::Schema,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => ErrorKind::Config,
            Self::LockPoisoned | Self::Json(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error is a rejection the caller can act on.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::Ownership | ErrorKind::NotFound
        )
    }

    /// Check if this error means the document could not be read or written.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("recipe title can't be empty");
        assert_eq!(
            err.to_string(),
            "invalid input: recipe title can't be empty"
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_ownership_error_display() {
        let err = Error::Ownership {
            id: 7,
            requester: "bob".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("bob"));
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_not_found_error_display() {
        let err = Error::NotFound { id: 42 };
        assert_eq!(err.to_string(), "there is no record with id 42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_storage_errors_are_not_caller_errors() {
        let err = Error::DocumentWrite {
            path: PathBuf::from("/data/recipes.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_storage_error());
        assert!(!err.is_caller_error());
        assert!(err.to_string().contains("/data/recipes.yaml"));
    }

    #[test]
    fn test_schema_error_kind() {
        let err: Error = SchemaError::new(vec!["missing 'title'".to_string()]).into();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("missing 'title'"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
        assert!(err.is_storage_error());
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_result: std::result::Result<i32, serde_yaml::Error> =
            serde_yaml::from_str("[unterminated");
        if let Err(yaml_err) = yaml_result {
            let err: Error = yaml_err.into();
            assert!(matches!(err, Error::Encode(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "recipes_file must not be empty".to_string(),
        };
        assert!(err.to_string().contains("recipes_file"));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("/root/forbidden"));
    }

    #[test]
    fn test_lock_poisoned_is_internal() {
        assert_eq!(Error::LockPoisoned.kind(), ErrorKind::Internal);
    }
}
