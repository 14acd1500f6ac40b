//! Error types for classcal.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or exporting a schedule.
#[derive(Error, Debug)]
pub enum ClassCalError {
    #[error("Invalid schedule file {}: {reason}", .path.display())]
    InvalidFile { path: PathBuf, reason: String },

    #[error("Schedule is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid schedule structure: {0}")]
    Validation(String),

    #[error("CSV generation error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for ClassCalError {
    fn from(e: csv::Error) -> Self {
        ClassCalError::Csv(e.to_string())
    }
}

/// Result type alias for classcal operations.
pub type ClassCalResult<T> = Result<T, ClassCalError>;
