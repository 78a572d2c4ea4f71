//! # Playlist reconciliation
//!
//! Converges automation-managed playlists to a desired state with the fewest
//! batched writes:
//!
//! - [`run_vault`] keeps the vault playlist equal (as a set) to the union of
//!   every owned playlist plus liked tracks, skipping playlists whose
//!   description contains [`EXCLUDE_DESCRIPTION_FLAG`]. With
//!   [`VaultOptions::chronological`] the vault is also ordered newest first.
//! - [`run_liked_mirror`] keeps the mirror playlist equal to liked tracks,
//!   newest first, order included.
//!
//! Both locate their target with [`resolve_playlist`] (explicit id, then tag,
//! then name, else create) and only ever mutate contents and description.
//! Everything runs sequentially against one [`PlaylistApi`] session. Writes
//! are not transactional: a failure mid-run leaves earlier batches in place
//! and the next run's diff picks up from there.

mod diff;
mod mirror;
mod resolve;
mod vault;

use serde::Serialize;

pub use diff::{TrackDiff, batches, dedup};
pub use mirror::{MirrorOutcome, mirror_exact, newest_first};
pub use resolve::{
    MANAGED_DESCRIPTION, PlaylistQuery, ResolvedBy, ResolvedPlaylist, find_playlist, has_tag,
    resolve_playlist, with_tag,
};
pub use vault::{
    Partition, VaultOutcome, aggregate_vault, aggregate_vault_chronological, is_excluded, partition,
};

use crate::{error::Result, spotify::PlaylistApi, types::TrackId};

/// Description marker that keeps a playlist out of the vault.
pub const EXCLUDE_DESCRIPTION_FLAG: &str = "-*";
/// Description tag identifying the vault playlist across runs.
pub const VAULT_TAG: &str = "[vaultsync:vault]";
/// Description tag identifying the liked songs mirror across runs.
pub const LIKED_TAG: &str = "[vaultsync:liked_mirror]";

#[derive(Debug, Clone)]
pub struct VaultOptions {
    pub playlist_name: String,
    pub playlist_id: Option<String>,
    pub dry_run: bool,
    /// Rewrite the vault ordered by when each track was first added, newest first
    pub chronological: bool,
}

#[derive(Debug, Clone)]
pub struct MirrorOptions {
    pub playlist_name: String,
    pub playlist_id: Option<String>,
    pub public: bool,
    pub dry_run: bool,
    /// Re-read the playlist afterwards and report its final length
    pub verify: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaultSummary {
    pub playlist_id: String,
    pub playlist_name: String,
    pub resolved_by: ResolvedBy,
    pub added: usize,
    pub removed: usize,
    pub excluded_playlists: usize,
    pub source_playlists: usize,
    pub chronological: bool,
    pub tag: &'static str,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirrorSummary {
    pub playlist_id: String,
    pub playlist_name: String,
    pub resolved_by: ResolvedBy,
    pub total_tracks: usize,
    pub added: usize,
    pub removed: usize,
    pub final_count: Option<usize>,
    pub tag: &'static str,
    pub dry_run: bool,
}

/// Aggregates every owned playlist and liked tracks into the vault.
pub async fn run_vault<A>(api: &A, options: &VaultOptions) -> Result<VaultSummary>
where
    A: PlaylistApi + ?Sized,
{
    let me = api.current_user().await?;
    let playlists = api.current_user_playlists().await?;

    let query = PlaylistQuery {
        explicit_id: options.playlist_id.as_deref(),
        tag: VAULT_TAG,
        name: &options.playlist_name,
        public: false,
    };
    let resolved = resolve_playlist(api, &me.id, &playlists, &query).await?;

    let liked = api.saved_tracks().await?;

    let outcome = if options.chronological {
        aggregate_vault_chronological(
            api,
            &me.id,
            &playlists,
            &liked,
            &resolved.playlist,
            options.dry_run,
        )
        .await?
    } else {
        let liked: Vec<TrackId> = liked.into_iter().map(|t| t.id).collect();
        aggregate_vault(
            api,
            &me.id,
            &playlists,
            &liked,
            &resolved.playlist,
            options.dry_run,
        )
        .await?
    };

    Ok(VaultSummary {
        playlist_id: resolved.playlist.id,
        playlist_name: resolved.playlist.name,
        resolved_by: resolved.matched_by,
        added: outcome.diff.to_add.len(),
        removed: outcome.diff.to_remove.len(),
        excluded_playlists: outcome.excluded_playlists,
        source_playlists: outcome.source_playlists,
        chronological: options.chronological,
        tag: VAULT_TAG,
        dry_run: options.dry_run,
    })
}

/// Mirrors liked tracks, newest first, into the mirror playlist.
pub async fn run_liked_mirror<A>(api: &A, options: &MirrorOptions) -> Result<MirrorSummary>
where
    A: PlaylistApi + ?Sized,
{
    let me = api.current_user().await?;
    let playlists = api.current_user_playlists().await?;

    let query = PlaylistQuery {
        explicit_id: options.playlist_id.as_deref(),
        tag: LIKED_TAG,
        name: &options.playlist_name,
        public: options.public,
    };
    let resolved = resolve_playlist(api, &me.id, &playlists, &query).await?;
    let playlist_id = resolved.playlist.id.clone();

    let mut saved = api.saved_tracks().await?;
    newest_first(&mut saved);
    let desired = dedup(saved.iter().map(|t| &t.id));

    let existing = api.playlist_track_ids(&playlist_id).await?;
    let diff = TrackDiff::between(&existing, &desired);

    let mut final_count = None;
    if !options.dry_run {
        mirror_exact(api, &playlist_id, &desired).await?;

        if options.verify {
            let count = api.playlist_track_ids(&playlist_id).await?.len();
            if count != desired.len() {
                log::warn!(
                    "Mirror '{}' holds {count} tracks, expected {}",
                    resolved.playlist.name,
                    desired.len()
                );
            }
            final_count = Some(count);
        }
    }

    Ok(MirrorSummary {
        playlist_id,
        playlist_name: resolved.playlist.name,
        resolved_by: resolved.matched_by,
        total_tracks: desired.len(),
        added: diff.to_add.len(),
        removed: diff.to_remove.len(),
        final_count,
        tag: LIKED_TAG,
        dry_run: options.dry_run,
    })
}
