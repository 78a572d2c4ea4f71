use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::{
    api::{ApiError, AppState, SessionUser},
    error::SyncError,
    management::TokenManager,
    spotify::{
        PlaylistApi, SpotifyClient,
        auth::{authorize_url, exchange_code_pkce},
    },
    types::{Profile, User},
    utils,
};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/login`
pub async fn login(State(app): State<AppState>) -> Result<Redirect, ApiError> {
    let (state, verifier) = app.sessions.begin_login().await;
    let challenge = utils::generate_code_challenge(&verifier);
    let url = authorize_url(&app.settings, &challenge, Some(&state))?;
    Ok(Redirect::to(&url))
}

/// `GET /callback`
///
/// Finishes the login started by [`login`]: exchanges the code, stores the
/// user's token and opens a session. With a frontend configured the browser
/// is sent back there, with `session_token` and `spotify_user_id` on success
/// or `login_error` on failure. Without one the outcome is answered as JSON.
pub async fn oauth_callback(
    State(app): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let result = finish_login(&app, params).await;

    let Some(frontend) = app.settings.frontend_url.as_deref() else {
        let (session_token, me) = result?;
        return Ok(Json(json!({
            "session_token": session_token,
            "spotify_user_id": me.id,
            "display_name": me.display_name,
        }))
        .into_response());
    };

    let url = match &result {
        Ok((session_token, me)) => frontend_redirect(
            frontend,
            &[
                ("session_token", session_token.as_str()),
                ("spotify_user_id", me.id.as_str()),
            ],
        )?,
        Err(err) => {
            log::warn!("Login failed: {}", err.message());
            frontend_redirect(frontend, &[("login_error", err.message().as_str())])?
        }
    };
    Ok(Redirect::to(url.as_str()).into_response())
}

async fn finish_login(app: &AppState, params: CallbackParams) -> Result<(String, User), ApiError> {
    if let Some(error) = params.error {
        return Err(ApiError::BadRequest(format!("Authorization denied: {error}")));
    }
    let (Some(code), Some(state)) = (params.code, params.state) else {
        return Err(ApiError::BadRequest("Missing code or state".into()));
    };
    let verifier = app
        .sessions
        .take_verifier(&state)
        .await
        .ok_or_else(|| ApiError::BadRequest("Unknown or expired login state".into()))?;

    let token = exchange_code_pkce(&app.settings, &code, &verifier).await?;
    let me = SpotifyClient::new(&app.settings.api_url, token.access_token.clone())
        .current_user()
        .await?;

    TokenManager::for_user(&me.id, token).persist().await?;
    let session_token = app.sessions.create_session(&me.id).await;
    app.profiles.lock().await.insert(
        me.id.clone(),
        Profile {
            spotify_user_id: me.id.clone(),
            display_name: me.name().to_string(),
        },
    );
    log::info!("Session opened for {}", me.id);

    Ok((session_token, me))
}

fn frontend_redirect(frontend: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
    Url::parse_with_params(frontend, params)
        .map_err(|e| SyncError::Config(format!("Invalid FRONTEND_URL: {e}")).into())
}

/// `GET /me`
pub async fn me(State(app): State<AppState>, user: SessionUser) -> Result<Json<Profile>, ApiError> {
    if let Some(profile) = app.profiles.lock().await.get(&user.user_id) {
        return Ok(Json(profile.clone()));
    }

    let client = app.client_for(&user.user_id).await?;
    let me = client.current_user().await?;
    let profile = Profile {
        spotify_user_id: me.id.clone(),
        display_name: me.name().to_string(),
    };
    app.profiles
        .lock()
        .await
        .insert(user.user_id, profile.clone());

    Ok(Json(profile))
}

/// `POST /auth/logout`
pub async fn logout(State(app): State<AppState>, user: SessionUser) -> Result<StatusCode, ApiError> {
    app.sessions.end_session(&user.session_token).await;
    app.profiles.lock().await.remove(&user.user_id);

    if let Err(e) = TokenManager::remove_for_user(&user.user_id).await {
        log::warn!("Could not remove stored token of {}: {e}", user.user_id);
    }
    Ok(StatusCode::NO_CONTENT)
}
