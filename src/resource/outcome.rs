//! Result states of a cached resource load

use chrono::{DateTime, Local, Utc};

use super::fetcher::FetchError;

/// Message shown for every non-rate-limit failure
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load profile. Please try again later.";

/// State of the current load
///
/// `Loading` moves to exactly one of the other variants, which then stay put
/// until a retry or a new activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// Request in flight
    Loading,
    /// Data from the cache or the remote
    Success { data: T },
    /// Remote is rate limiting us; `retry_after` is the local reset time, when known
    RateLimited { retry_after: Option<String> },
    /// Anything else went wrong; `reason` is safe to show to the user
    Failed { reason: String },
}

impl<T> FetchOutcome<T> {
    /// Classifies a fetcher error
    pub fn from_error(err: &FetchError) -> Self {
        match err {
            FetchError::RateLimited { reset } => FetchOutcome::RateLimited {
                retry_after: reset.map(format_reset),
            },
            FetchError::Status(_) | FetchError::Network(_) | FetchError::Parse(_) => {
                FetchOutcome::Failed {
                    reason: LOAD_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchOutcome::Loading)
    }

    /// True for the outcomes that offer a retry action
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FetchOutcome::RateLimited { .. } | FetchOutcome::Failed { .. }
        )
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchOutcome::Success { data } => Some(data),
            _ => None,
        }
    }
}

/// Formats a rate-limit reset instant as local wall-clock time
pub fn format_reset(reset: DateTime<Utc>) -> String {
    reset.with_timezone(&Local).format("%H:%M:%S").to_string()
}
