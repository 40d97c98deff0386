//! Unified error hierarchy for ergrs
//!
//! The scoring engine itself is infallible; these errors come from the edges
//! (importing workouts, writing reports, configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all ergrs operations
#[derive(Debug, Error)]
pub enum ErgRsError {
    /// Workout data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Import/export errors
    #[error("Import/Export error: {0}")]
    ImportExport(#[from] ImportExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Import and export errors
#[derive(Debug, Error)]
pub enum ImportExportError {
    /// Unsupported format
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// Format-specific parsing error
    #[error("Parse error in {format}: {reason}")]
    ParseError { format: String, reason: String },

    /// Missing required data
    #[error("Missing required data: {field}")]
    MissingData { field: String },

    /// Invalid data structure
    #[error("Invalid data structure: {reason}")]
    InvalidStructure { reason: String },

    /// Export failed
    #[error("Export failed to {path}: {reason}")]
    ExportFailed { path: PathBuf, reason: String },
}

/// Result type alias for ergrs operations
pub type Result<T> = std::result::Result<T, ErgRsError>;

impl ErgRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErgRsError::Validation(_) => ErrorSeverity::Warning,
            ErgRsError::ImportExport(ImportExportError::MissingData { .. }) => {
                ErrorSeverity::Warning
            }
            ErgRsError::Internal(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ErgRsError::ImportExport(ImportExportError::UnsupportedFormat { format }) => {
                format!("Workout files of type '{}' are not supported. Use JSON or CSV.", format)
            }
            ErgRsError::ImportExport(ImportExportError::MissingData { field }) => {
                format!(
                    "The workout file is missing '{}'. Please check the export from your monitor.",
                    field
                )
            }
            ErgRsError::Validation(reason) => {
                format!("Workout data looks wrong: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
