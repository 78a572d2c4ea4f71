//! # CLI Module
//!
//! Command-line front end of vaultsync. Every command loads the
//! [`Settings`] from the environment, reports progress with the crate's
//! console macros and exits with code 1 on fatal errors.
//!
//! ## Commands
//!
//! - [`auth`] - OAuth 2.0 PKCE login through the local callback server
//! - [`vault`] - Aggregates all owned playlists and liked tracks into the vault
//! - [`liked`] - Mirrors liked tracks, newest first, into the mirror playlist
//! - [`playlists`] - Lists owned playlists with their role in the sync
//! - [`serve`] - Runs the HTTP front end
//!
//! ## Usage
//!
//! ```bash
//! vaultsync auth                        # Authenticate with Spotify
//! vaultsync vault --dry-run             # Show what the vault run would change
//! vaultsync liked --verify              # Mirror liked songs and check the result
//! vaultsync playlists                   # Which playlists feed the vault
//! ```
//!
//! Commands share one token stored in the local data directory. The sync
//! commands run strictly sequentially against a single API session.

mod auth;
mod liked;
mod playlists;
mod serve;
mod vault;

pub use auth::auth;
pub use liked::liked;
pub use playlists::playlists;
pub use serve::serve;
pub use vault::vault;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings,
    error,
    management::TokenManager,
    spotify::{RetryPolicy, SpotifyClient},
};

/// Loads the settings or exits with the missing variables.
pub fn settings() -> Settings {
    match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("{}", e),
    }
}

/// Builds an API client from the stored token, refreshing it when needed.
async fn client(settings: &Settings, unbounded_retries: bool) -> SpotifyClient {
    let mut token_mgr = match TokenManager::load().await {
        Ok(mgr) => mgr,
        Err(_) => error!("No valid token found. Please run `vaultsync auth` first."),
    };

    let token = match token_mgr.get_valid_token(settings).await {
        Ok(token) => token,
        Err(e) => error!("Could not refresh the access token: {}", e),
    };

    let retry = if unbounded_retries {
        RetryPolicy::unbounded()
    } else {
        RetryPolicy::default()
    };
    SpotifyClient::new(&settings.api_url, token).with_retry_policy(retry)
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
