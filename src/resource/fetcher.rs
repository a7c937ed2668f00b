//! The remote side of a cached resource

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::cache::ResourceKey;

/// Failures reported by a [`Fetcher`]
///
/// These are hard failures: unlike cache problems they end up in front of the
/// user, as either a rate-limit notice or a generic failure notice.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Remote asked us to back off
    #[error("rate limit exceeded (resets at {reset:?})")]
    RateLimited { reset: Option<DateTime<Utc>> },

    /// Any other non-success HTTP status
    #[error("unexpected status code: {0}")]
    Status(u16),

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Body did not decode
    #[error("invalid response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            FetchError::Network("Failed to connect".to_string())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Performs the remote call for a resource key
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    async fn fetch(&self, key: &ResourceKey) -> Result<T, FetchError>;
}
