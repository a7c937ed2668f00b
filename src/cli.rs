//! Command-line interface parsing for ghpeek
//!
//! This module handles parsing of CLI arguments using clap. Every option can
//! also come from a `GHPEEK_*` environment variable.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::data::github::GITHUB_API_URL;

/// Longest username GitHub allows
const MAX_USERNAME_LEN: usize = 39;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The username cannot be a GitHub login
    #[error("Invalid username: '{0}'. Usernames are 1-39 letters, digits or hyphens")]
    InvalidUsername(String),

    /// A zero TTL would make every cached entry stale on arrival
    #[error("Invalid TTL: must be at least 1 second")]
    InvalidTtl,
}

/// ghpeek - preview a GitHub profile card in the terminal
#[derive(Parser, Debug)]
#[command(name = "ghpeek")]
#[command(about = "Preview a GitHub profile card, with a short-lived local cache")]
#[command(version)]
pub struct Cli {
    /// GitHub username to preview
    pub username: String,

    /// How long a cached profile stays fresh, in seconds
    #[arg(long, value_name = "SECONDS", env = "GHPEEK_TTL", default_value_t = 300)]
    pub ttl: u64,

    /// Cache directory (defaults to the platform cache directory)
    #[arg(long, value_name = "DIR", env = "GHPEEK_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// GitHub API root
    #[arg(long, value_name = "URL", env = "GHPEEK_API_URL", default_value = GITHUB_API_URL)]
    pub api_url: String,

    /// Print the card once as plain text instead of opening the terminal UI
    #[arg(long)]
    pub print: bool,

    /// Drop the cached profile before loading
    #[arg(long)]
    pub clear_cache: bool,

    /// Write diagnostic logs (stderr with --print, ghpeek.log in the cache directory otherwise)
    #[arg(long)]
    pub debug: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub username: String,
    pub ttl: Duration,
    pub cache_dir: Option<PathBuf>,
    pub api_url: String,
    pub print: bool,
    pub clear_cache: bool,
    pub debug: bool,
}

/// Validates a GitHub username argument
///
/// # Returns
/// * `Ok(String)` with surrounding whitespace removed
/// * `Err(CliError::InvalidUsername)` if it cannot be a GitHub login
pub fn parse_username(s: &str) -> Result<String, CliError> {
    let username = s.trim();
    let valid = !username.is_empty()
        && username.len() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-');

    if valid {
        Ok(username.to_string())
    } else {
        Err(CliError::InvalidUsername(s.to_string()))
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let username = parse_username(&cli.username)?;
        if cli.ttl == 0 {
            return Err(CliError::InvalidTtl);
        }

        Ok(StartupConfig {
            username,
            ttl: Duration::from_secs(cli.ttl),
            cache_dir: cli.cache_dir.clone(),
            api_url: cli.api_url.clone(),
            print: cli.print,
            clear_cache: cli.clear_cache,
            debug: cli.debug,
        })
    }
}
