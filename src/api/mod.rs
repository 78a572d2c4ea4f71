//! # API Module
//!
//! HTTP endpoints for the vaultsync web server and for the local OAuth
//! callback used by `vaultsync auth`.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - `GET /auth/login`, redirects to the Spotify consent page (PKCE)
//! - [`oauth_callback`] - `GET /callback`, exchanges the code and opens a session
//! - [`logout`] - `POST /auth/logout`, drops the session and the stored token
//! - [`callback`] - `GET /callback` of the command line login server
//!
//! ### Sessions
//!
//! - [`me`] - `GET /me`, the logged in user
//! - [`run_vaulted`] - `POST /run/vaulted`, runs the vault aggregation
//! - [`run_liked`] - `POST /run/liked`, runs the liked songs mirror
//!
//! ### Monitoring
//!
//! - [`health`] - `GET /health`, status and version
//!
//! Session endpoints expect `Authorization: Bearer <session token>`; the
//! token is handed out by [`oauth_callback`]. Errors are answered as
//! `{"error": "..."}` with a status matching [`ApiError`].

mod callback;
mod health;
mod run;
mod session;

use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tokio::sync::Mutex;

pub use callback::callback;
pub use health::health;
pub use run::{run_liked, run_vaulted};
pub use session::{login, logout, me, oauth_callback};

use crate::{
    config::Settings,
    error::SyncError,
    management::{SessionStore, TokenManager, TtlCache},
    spotify::SpotifyClient,
    types::Profile,
    utils,
};

/// How long a fetched profile is served from memory.
pub const PROFILE_TTL: std::time::Duration = std::time::Duration::from_secs(300);

/// Shared state of the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<SessionStore>,
    pub profiles: Arc<Mutex<TtlCache<String, Profile>>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            sessions: Arc::new(SessionStore::default()),
            profiles: Arc::new(Mutex::new(TtlCache::new(PROFILE_TTL))),
        }
    }

    /// Opens an API session for `user_id` with their stored token.
    pub async fn client_for(&self, user_id: &str) -> Result<SpotifyClient, ApiError> {
        let mut token_mgr = TokenManager::load_for_user(user_id)
            .await
            .map_err(|_| ApiError::Unauthorized("No stored Spotify token, log in again".into()))?;
        let token = token_mgr.get_valid_token(&self.settings).await?;
        Ok(SpotifyClient::new(&self.settings.api_url, token))
    }
}

/// Error answered by the HTTP endpoints.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Sync(SyncError),
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        ApiError::Sync(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Sync(err) => match err {
                SyncError::NotFound(_) => StatusCode::NOT_FOUND,
                SyncError::Auth(_) => StatusCode::UNAUTHORIZED,
                SyncError::Request(_) | SyncError::Api { .. } | SyncError::RateLimited { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                SyncError::Config(_)
                | SyncError::BatchTooLarge { .. }
                | SyncError::Io(_)
                | SyncError::Serde(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) | ApiError::Unauthorized(message) => message.clone(),
            ApiError::Sync(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Sync(err) = &self {
            log::warn!("Request failed: {err}");
        }

        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

/// The user behind the request's bearer session token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: String,
    pub session_token: String,
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(utils::parse_bearer)
            .ok_or_else(|| ApiError::Unauthorized("Missing session token".into()))?
            .to_string();

        let user_id = state
            .sessions
            .user_for(&session_token)
            .await
            .ok_or_else(|| ApiError::Unauthorized("Unknown or expired session".into()))?;

        Ok(SessionUser {
            user_id,
            session_token,
        })
    }
}
