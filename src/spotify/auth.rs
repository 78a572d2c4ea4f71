use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::{
    config::Settings,
    error::{Result, SyncError},
    management::TokenManager,
    server::start_callback_server,
    types::{PkceToken, Token},
    utils, warning,
};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<u64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh_token: Option<&str>) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_string))
                .unwrap_or_default(),
            scope: self.scope.unwrap_or_default(),
            expires_in: self.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

/// Builds the authorization URL for the PKCE flow.
///
/// `state` is echoed back on the callback; the HTTP front end uses it to find
/// the matching code verifier.
pub fn authorize_url(settings: &Settings, code_challenge: &str, state: Option<&str>) -> Result<String> {
    let mut params = vec![
        ("client_id", settings.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", settings.redirect_uri.as_str()),
        ("code_challenge", code_challenge),
        ("code_challenge_method", "S256"),
        ("scope", settings.scope.as_str()),
    ];
    if let Some(state) = state {
        params.push(("state", state));
    }

    let url = Url::parse_with_params(&settings.auth_url, &params)
        .map_err(|e| SyncError::Config(format!("Invalid auth url: {e}")))?;
    Ok(url.to_string())
}

/// Runs the interactive PKCE login for the command line.
///
/// Starts the local callback server, opens the authorization page in the
/// browser, waits up to 60 seconds for the callback and persists the token.
pub async fn auth(settings: &Settings, shared_state: Arc<Mutex<Option<PkceToken>>>) -> Result<()> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let server_state = Arc::clone(&shared_state);
    let server_settings = Arc::new(settings.clone());
    tokio::spawn(async move {
        if let Err(e) = start_callback_server(server_settings, server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let auth_url = authorize_url(settings, &code_challenge, None)?;

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(token) => TokenManager::new(token).persist().await,
        None => Err(SyncError::Auth(
            "Authentication failed or timed out.".to_string(),
        )),
    }
}

async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

async fn request_token(settings: &Settings, form: &[(&str, &str)]) -> Result<TokenResponse> {
    let response = Client::new()
        .post(&settings.token_url)
        .form(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SyncError::Auth(format!("token endpoint answered {status}: {message}")));
    }

    Ok(response.json::<TokenResponse>().await?)
}

/// Exchanges a refresh token for a fresh access token.
///
/// The refresh token may rotate; when the response carries none the old one is kept.
pub async fn refresh_token(settings: &Settings, refresh_token: &str) -> Result<Token> {
    let response = request_token(
        settings,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", settings.client_id.as_str()),
        ],
    )
    .await?;

    Ok(response.into_token(Some(refresh_token)))
}

/// Exchanges an authorization code plus the PKCE verifier for a token.
pub async fn exchange_code_pkce(settings: &Settings, code: &str, verifier: &str) -> Result<Token> {
    let response = request_token(
        settings,
        &[
            ("grant_type", "authorization_code"),
            ("client_id", settings.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", settings.redirect_uri.as_str()),
        ],
    )
    .await?;

    Ok(response.into_token(None))
}
