//! Common error types for the BNC ingest workspace

use thiserror::Error;

/// Common result type for storage and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the storage and configuration layers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Existing table does not match its declared schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Row refers to a table or column the schema does not declare
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
