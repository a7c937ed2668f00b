//! Profile data shown on the preview card
//!
//! This module contains the profile model and the client that fetches it.

pub mod github;

pub use github::GitHubClient;

use serde::{Deserialize, Serialize};

/// Public profile of a GitHub user
///
/// Field names follow the GitHub REST API so the response body decodes
/// directly; fields the card does not use are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Display name, if the user set one
    #[serde(default)]
    pub name: Option<String>,
    /// Handle (`login` in the API)
    pub login: String,
    /// Short bio
    #[serde(default)]
    pub bio: Option<String>,
    pub avatar_url: String,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    #[serde(default)]
    pub public_repos: u32,
    /// Link to the profile page
    pub html_url: String,
}

impl Profile {
    /// The display name, falling back to the handle when no name is set
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.login,
        }
    }

    /// The bio with surrounding whitespace removed, if non-empty
    pub fn short_bio(&self) -> Option<&str> {
        self.bio
            .as_deref()
            .map(str::trim)
            .filter(|bio| !bio.is_empty())
    }
}
