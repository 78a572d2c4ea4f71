use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config::{self, Settings},
    error::Result,
    spotify,
    types::Token,
};

/// Seconds before expiry at which a token is refreshed.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Persists an OAuth token and refreshes it when it is about to expire.
///
/// The command line keeps a single token in `cache/token.json`; the HTTP front
/// end keeps one file per user under `tokens/`.
pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager {
            token,
            path: Self::token_path(),
        }
    }

    pub fn for_user(user_id: &str, token: Token) -> Self {
        TokenManager {
            token,
            path: Self::user_token_path(user_id),
        }
    }

    pub async fn load() -> Result<Self> {
        Self::load_from(Self::token_path()).await
    }

    pub async fn load_for_user(user_id: &str) -> Result<Self> {
        Self::load_from(Self::user_token_path(user_id)).await
    }

    async fn load_from(path: PathBuf) -> Result<Self> {
        let content = async_fs::read_to_string(&path).await?;
        let token: Token = serde_json::from_str(&content)?;
        Ok(Self { token, path })
    }

    pub async fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Deletes the stored token file.
    pub async fn remove_for_user(user_id: &str) -> Result<()> {
        let path = Self::user_token_path(user_id);
        if path.is_file() {
            async_fs::remove_file(path).await?;
        }
        Ok(())
    }

    /// Returns an access token valid for at least a few more minutes.
    ///
    /// Refreshes and persists the token when it is close to expiry.
    pub async fn get_valid_token(&mut self, settings: &Settings) -> Result<String> {
        if self.is_expired() {
            let new_token = spotify::auth::refresh_token(settings, &self.token.refresh_token).await?;
            self.token = new_token;
            self.persist().await?;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    fn user_token_path(user_id: &str) -> PathBuf {
        let file_name: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        config::data_dir().join(format!("tokens/{file_name}.json"))
    }
}
