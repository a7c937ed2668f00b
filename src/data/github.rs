//! GitHub REST API client for user profiles
//!
//! Fetches `GET /users/{login}` and tells rate limiting apart from other
//! failures, so the card can show a reset time instead of a generic error.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use reqwest::header::{HeaderMap, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};

use super::Profile;
use crate::cache::ResourceKey;
use crate::resource::{FetchError, Fetcher};

/// Base URL for the GitHub REST API
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Resource kind used in cache keys
pub const PROFILE_KIND: &str = "github_profile";

/// Per-request timeout
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Cache key for a user's profile
pub fn profile_key(login: &str) -> ResourceKey {
    ResourceKey::new(PROFILE_KIND, login)
}

/// Client for fetching public profiles
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubClient {
    /// Creates a client for the public GitHub API
    pub fn new() -> Self {
        Self::with_base_url(GITHUB_API_URL)
    }

    /// Creates a client against another API root (GitHub Enterprise, test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the profile for `login`
    ///
    /// # Returns
    /// * `Ok(Profile)` - The decoded profile
    /// * `Err(FetchError::RateLimited)` - 429, or 403 carrying rate-limit headers
    /// * `Err(FetchError::Status)` - Any other non-success status
    /// * `Err(FetchError::Network | FetchError::Parse)` - Transport or decoding failure
    pub async fn fetch_profile(&self, login: &str) -> Result<Profile, FetchError> {
        let url = format!("{}/users/{}", self.base_url, login);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("ghpeek/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            if let Some(err) = rate_limit_error(status, response.headers(), Utc::now()) {
                return Err(err);
            }
            return Err(FetchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let profile: Profile = serde_json::from_str(&text)?;
        Ok(profile)
    }
}

#[async_trait]
impl Fetcher<Profile> for GitHubClient {
    async fn fetch(&self, key: &ResourceKey) -> Result<Profile, FetchError> {
        self.fetch_profile(key.id()).await
    }
}

/// Reads an integer header
fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
}

/// Returns a rate-limit error when the response signals one
///
/// GitHub reports an exhausted primary limit as 403 with
/// `X-RateLimit-Remaining: 0` and `X-RateLimit-Reset` (unix seconds), and
/// secondary limits as 403 or 429 with `Retry-After` (seconds).
fn rate_limit_error(
    status: StatusCode,
    headers: &HeaderMap,
    now: DateTime<Utc>,
) -> Option<FetchError> {
    let reset = header_i64(headers, "x-ratelimit-reset")
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    let retry_after = header_i64(headers, "retry-after")
        .filter(|secs| *secs >= 0)
        .and_then(Duration::try_seconds)
        .and_then(|delay| now.checked_add_signed(delay));
    let exhausted = header_i64(headers, "x-ratelimit-remaining") == Some(0);

    let limited = match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::FORBIDDEN => exhausted || reset.is_some() || retry_after.is_some(),
        _ => false,
    };

    limited.then(|| FetchError::RateLimited {
        reset: retry_after.or(reset),
    })
}
