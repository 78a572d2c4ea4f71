use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    api::{ApiError, AppState, SessionUser},
    sync::{self, MirrorOptions, MirrorSummary, VaultOptions, VaultSummary},
};

/// Optional overrides of a run, given as query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RunParams {
    pub playlist_name: Option<String>,
    pub playlist_id: Option<String>,
    pub public: Option<bool>,
    pub dry_run: bool,
    pub verify: bool,
    pub chronological: bool,
}

/// `POST /run/vaulted`
pub async fn run_vaulted(
    State(app): State<AppState>,
    user: SessionUser,
    Query(params): Query<RunParams>,
) -> Result<Json<VaultSummary>, ApiError> {
    let client = app.client_for(&user.user_id).await?;
    let options = VaultOptions {
        playlist_name: params
            .playlist_name
            .unwrap_or_else(|| app.settings.vault_playlist_name.clone()),
        playlist_id: params.playlist_id,
        dry_run: params.dry_run,
        chronological: params.chronological,
    };

    let summary = sync::run_vault(&client, &options).await?;
    log::info!(
        "Vault run for {}: +{} -{}",
        user.user_id,
        summary.added,
        summary.removed
    );
    Ok(Json(summary))
}

/// `POST /run/liked`
pub async fn run_liked(
    State(app): State<AppState>,
    user: SessionUser,
    Query(params): Query<RunParams>,
) -> Result<Json<MirrorSummary>, ApiError> {
    let client = app.client_for(&user.user_id).await?;
    let options = MirrorOptions {
        playlist_name: params
            .playlist_name
            .unwrap_or_else(|| app.settings.mirror_playlist_name.clone()),
        playlist_id: params.playlist_id,
        public: params.public.unwrap_or(app.settings.mirror_public),
        dry_run: params.dry_run,
        verify: params.verify,
    };

    let summary = sync::run_liked_mirror(&client, &options).await?;
    log::info!(
        "Liked mirror run for {}: {} tracks",
        user.user_id,
        summary.total_tracks
    );
    Ok(Json(summary))
}
