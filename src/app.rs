//! Application state management for ghpeek
//!
//! This module contains the main application state, handling keyboard input
//! and opening/closing the profile card.

use crossterm::event::{KeyCode, KeyEvent};

use crate::cache::{CacheBackend, CacheStore, FileBackend, ResourceKey};
use crate::cli::StartupConfig;
use crate::clock::{Clock, SystemClock};
use crate::data::github::profile_key;
use crate::data::{GitHubClient, Profile};
use crate::error::{Error, Result};
use crate::resource::{CachedResource, FetchOutcome, Fetcher};

/// Application state enum representing the current view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Card closed
    Home,
    /// Profile card open
    Card,
}

/// Profile resource used by the real application
pub type ProfileResource = CachedResource<Profile, GitHubClient, FileBackend, SystemClock>;

/// Builds the profile resource described by the startup configuration
pub fn build_resource(config: &StartupConfig) -> Result<ProfileResource> {
    let backend = match &config.cache_dir {
        Some(dir) => FileBackend::with_dir(dir.clone()),
        None => FileBackend::new().ok_or(Error::NoCacheDir)?,
    };
    let client = GitHubClient::with_base_url(config.api_url.clone());

    Ok(CachedResource::new(CacheStore::new(backend), client, SystemClock).with_ttl(config.ttl))
}

/// Main application struct managing state and the card's resource
pub struct App<F = GitHubClient, B = FileBackend, C = SystemClock> {
    /// Current application state/view
    pub state: AppState,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    username: String,
    key: ResourceKey,
    resource: CachedResource<Profile, F, B, C>,
}

impl App {
    /// Creates the application from startup configuration
    pub fn new(config: &StartupConfig) -> Result<Self> {
        Ok(Self::with_resource(&config.username, build_resource(config)?))
    }
}

impl<F, B, C> App<F, B, C>
where
    F: Fetcher<Profile> + 'static,
    B: CacheBackend,
    C: Clock,
{
    /// Creates an app around an existing resource, with the card closed
    pub fn with_resource(username: &str, resource: CachedResource<Profile, F, B, C>) -> Self {
        Self {
            state: AppState::Home,
            should_quit: false,
            show_help: false,
            username: username.to_string(),
            key: profile_key(username),
            resource,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Current card outcome; `None` while the card is closed
    pub fn outcome(&self) -> Option<&FetchOutcome<Profile>> {
        self.resource.outcome()
    }

    /// Opens the card, starting a load
    pub fn open_card(&mut self) {
        self.state = AppState::Card;
        self.resource.open(self.key.clone());
    }

    /// Closes the card; an in-flight load is dropped
    pub fn close_card(&mut self) {
        self.state = AppState::Home;
        self.resource.close();
    }

    /// Retries a failed or rate-limited load
    pub fn retry(&mut self) {
        if self.outcome().is_some_and(FetchOutcome::is_retryable) {
            self.resource.retry();
        }
    }

    /// Applies any finished fetch; returns true if the card changed
    pub fn tick(&mut self) -> bool {
        self.resource.poll()
    }

    /// Waits for the in-flight load, if any
    pub async fn settle(&mut self) {
        self.resource.settle().await;
    }

    /// Drops the cached profile for the current user
    pub fn clear_cache(&self) {
        if let Err(failure) = self.resource.store().remove(&self.key) {
            log::debug!("Failed to clear cache for {}: {}", self.key, failure);
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `Esc` (on Home): Quit the application
    /// - `Enter`/`o` (on Home): Open the profile card
    /// - `Esc` (on Card): Close the card
    /// - `r` (on Card): Retry after a failure or rate limit
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {} // Ignore other keys when help is shown
            }
            return;
        }

        match self.state {
            AppState::Home => match key_event.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Enter | KeyCode::Char('o') => {
                    self.open_card();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
            AppState::Card => match key_event.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.close_card();
                }
                KeyCode::Char('r') => {
                    self.retry();
                }
                KeyCode::Char('?') => {
                    self.show_help = true;
                }
                _ => {}
            },
        }
    }
}
