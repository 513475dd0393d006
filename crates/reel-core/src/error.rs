//! Error types for reel-core

use thiserror::Error;

use crate::api::ApiError;

/// Result type alias using reel-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reel-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote movie service error
    #[error("Remote error: {0}")]
    Remote(#[from] ApiError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
