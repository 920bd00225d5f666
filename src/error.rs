//! Custom error types for VitalDesk
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for VitalDesk operations
#[derive(Error, Debug)]
pub enum VitalError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Restore failed after the stores were touched; the log has the details
    #[error("Import error: {message} (see {})", .log_path.display())]
    Import { message: String, log_path: PathBuf },

    /// Backup file to restore from does not exist
    #[error("Backup file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Backup file is structurally unusable
    #[error("Invalid backup file: {0}")]
    InvalidFormat(String),
}

impl VitalError {
    /// Create a "not found" error for patients
    pub fn patient_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Patient",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error was raised before any store mutation
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::InvalidFormat(_))
    }
}

impl From<std::io::Error> for VitalError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VitalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for VitalDesk operations
pub type VitalResult<T> = Result<T, VitalError>;
