use axum::{
    Extension, Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    api::{self, AppState},
    config::Settings,
    error::{Result, SyncError},
    types::PkceToken,
};

/// Runs the local server that receives the OAuth callback of `vaultsync auth`.
pub async fn start_callback_server(
    settings: Arc<Settings>,
    state: Arc<Mutex<Option<PkceToken>>>,
) -> Result<()> {
    let addr = parse_addr(&settings.server_addr)?;
    let app = callback_router(settings, state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Routes of the command line login server.
pub fn callback_router(settings: Arc<Settings>, state: Arc<Mutex<Option<PkceToken>>>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(settings))
}

/// Routes of the HTTP front end.
pub fn router(state: AppState) -> Router {
    let cors = match state.settings.frontend_url.as_deref().map(frontend_origin) {
        Some(Some(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        _ => CorsLayer::permissive(),
    };

    Router::new()
        .route("/health", get(api::health))
        .route("/auth/login", get(api::login))
        .route("/callback", get(api::oauth_callback))
        .route("/me", get(api::me))
        .route("/run/vaulted", post(api::run_vaulted))
        .route("/run/liked", post(api::run_liked))
        .route("/auth/logout", post(api::logout))
        .layer(cors)
        .with_state(state)
}

/// Serves the HTTP front end on `settings.server_addr` until shut down.
pub async fn start_server(settings: Settings) -> Result<()> {
    let addr = parse_addr(&settings.server_addr)?;
    let app = router(AppState::new(settings));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn parse_addr(addr: &str) -> Result<SocketAddr> {
    SocketAddr::from_str(addr)
        .map_err(|e| SyncError::Config(format!("Failed to parse server address '{addr}': {e}")))
}

/// The `scheme://host[:port]` part of the frontend url.
fn frontend_origin(frontend_url: &str) -> Option<HeaderValue> {
    let url = url::Url::parse(frontend_url).ok()?;
    HeaderValue::from_str(&url.origin().ascii_serialization()).ok()
}
