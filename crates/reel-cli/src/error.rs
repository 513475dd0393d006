use std::io;

use reel_core::MovieId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] reel_core::Error),
    #[error(transparent)]
    Api(#[from] reel_core::api::ApiError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Movie title cannot be empty")]
    EmptyTitle,
    #[error("Movie not found: {0}")]
    MovieNotFound(MovieId),
    #[error("Refresh failed; local movies were left unchanged")]
    RefreshFailed,
    #[error("Movie service did not accept the new movie")]
    AddFailed,
    #[error("Could not resolve a data directory; pass --db-path or set REEL_DB_PATH")]
    NoDataDir,
}
