//! Error types for the ghpeek binary

use thiserror::Error;

use crate::cli::CliError;

/// Result type alias for startup and terminal operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
///
/// Only startup and terminal problems end up here. Fetch and cache failures
/// are part of the card's outcome instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Cli(#[from] CliError),

    #[error("Could not determine a cache directory. Pass --cache-dir or set GHPEEK_CACHE_DIR.")]
    NoCacheDir,

    #[error("Failed to set up logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
