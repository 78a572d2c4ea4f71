//! Configuration management for vaultsync.
//!
//! Values are read from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)
//!
//! Everything is gathered once into a [`Settings`] value that is passed to the
//! OAuth helpers, the token manager and the HTTP front end.

use std::{env, path::PathBuf};

use crate::error::{Result, SyncError};

pub const DEFAULT_SCOPE: &str = "user-library-read playlist-read-private playlist-read-collaborative playlist-modify-private playlist-modify-public";
pub const DEFAULT_VAULT_PLAYLIST_NAME: &str = "_vaulted";
pub const DEFAULT_MIRROR_PLAYLIST_NAME: &str = "Liked Songs Mirror";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub server_addr: String,
    pub frontend_url: Option<String>,
    pub vault_playlist_name: String,
    pub mirror_playlist_name: String,
    pub mirror_public: bool,
}

impl Settings {
    /// Reads the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] naming every missing required variable.
    pub fn from_env() -> Result<Self> {
        let missing: Vec<&str> = ["SPOTIFY_API_AUTH_CLIENT_ID", "SPOTIFY_API_REDIRECT_URI"]
            .into_iter()
            .filter(|key| required(key).is_err())
            .collect();
        if !missing.is_empty() {
            return Err(SyncError::Config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            client_id: spotify_client_id()?,
            redirect_uri: spotify_redirect_uri()?,
            scope: spotify_scope(),
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
            server_addr: server_addr(),
            frontend_url: frontend_url(),
            vault_playlist_name: vault_playlist_name(),
            mirror_playlist_name: mirror_playlist_name(),
            mirror_public: mirror_playlist_public(),
        })
    }

    /// Settings with public defaults and the given client credentials.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            api_url: "https://api.spotify.com/v1".to_string(),
            server_addr: "127.0.0.1:8080".to_string(),
            frontend_url: None,
            vault_playlist_name: DEFAULT_VAULT_PLAYLIST_NAME.to_string(),
            mirror_playlist_name: DEFAULT_MIRROR_PLAYLIST_NAME.to_string(),
            mirror_public: false,
        }
    }
}

/// Returns the directory holding the `.env` file, token cache and user tokens.
///
/// - Linux: `~/.local/share/vaultsync`
/// - macOS: `~/Library/Application Support/vaultsync`
/// - Windows: `%LOCALAPPDATA%/vaultsync`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("vaultsync");
    path
}

/// Loads environment variables from `<data dir>/.env`.
///
/// Creates the data directory when needed. A missing `.env` file is fine,
/// variables may come from the process environment alone.
pub async fn load_env() -> Result<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| SyncError::Config(e.to_string()))?;
    }
    Ok(())
}

fn required(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(SyncError::Config(format!("{key} must be set"))),
    }
}

fn optional(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Address the HTTP server binds to, e.g. `127.0.0.1:8080`.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", "127.0.0.1:8080")
}

/// Client id registered on the Spotify developer dashboard.
pub fn spotify_client_id() -> Result<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Callback URL registered for the application, e.g. `http://127.0.0.1:8080/callback`.
pub fn spotify_redirect_uri() -> Result<String> {
    required("SPOTIFY_API_REDIRECT_URI")
}

pub fn spotify_scope() -> String {
    optional("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    optional(
        "SPOTIFY_API_AUTH_URL",
        "https://accounts.spotify.com/authorize",
    )
}

pub fn spotify_apitoken_url() -> String {
    optional(
        "SPOTIFY_API_TOKEN_URL",
        "https://accounts.spotify.com/api/token",
    )
}

pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", "https://api.spotify.com/v1")
}

/// Where the HTTP front end sends the browser after a successful login.
pub fn frontend_url() -> Option<String> {
    env::var("FRONTEND_URL")
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

pub fn vault_playlist_name() -> String {
    optional("VAULT_PLAYLIST_NAME", DEFAULT_VAULT_PLAYLIST_NAME)
}

pub fn mirror_playlist_name() -> String {
    optional("MIRROR_PLAYLIST_NAME", DEFAULT_MIRROR_PLAYLIST_NAME)
}

pub fn mirror_playlist_public() -> bool {
    optional("MIRROR_PLAYLIST_PUBLIC", "false").eq_ignore_ascii_case("true")
}
