//! Common error types for FDP

use thiserror::Error;

use crate::validate::ValidationErrors;

/// Common result type for FDP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the FDP crates
#[derive(Error, Debug)]
pub enum Error {
    /// Client input failed field validation
    #[error("Invalid project data: {0}")]
    Validation(#[from] ValidationErrors),

    /// Write would break design project number uniqueness
    #[error("Design project number already exists: {0}")]
    DuplicateKey(String),

    /// CSV text could not be read or written
    #[error("CSV error: {0}")]
    Csv(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}
