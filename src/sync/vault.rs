use std::collections::HashSet;

use crate::{
    error::{Result, SyncError},
    spotify::PlaylistApi,
    sync::{
        EXCLUDE_DESCRIPTION_FLAG,
        diff::{TrackDiff, batches, dedup},
        mirror::{mirror_exact, newest_first},
    },
    types::{Playlist, SavedTrack, TrackId},
};

/// Owned playlists split by their role in the vault aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition<'p> {
    pub sources: Vec<&'p Playlist>,
    /// Owned playlists carrying the exclusion flag
    pub excluded: usize,
}

/// What [`aggregate_vault`] changed (or would change, on a dry run).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VaultOutcome {
    pub diff: TrackDiff,
    pub excluded_playlists: usize,
    pub source_playlists: usize,
}

pub fn is_excluded(playlist: &Playlist) -> bool {
    playlist.description.contains(EXCLUDE_DESCRIPTION_FLAG)
}

/// Splits the user's playlists into sources and excluded ones.
///
/// Playlists owned by others are ignored. The target never becomes a source;
/// it is still counted when it carries the exclusion flag.
pub fn partition<'p>(playlists: &'p [Playlist], user_id: &str, target_id: &str) -> Partition<'p> {
    let mut partition = Partition::default();

    for playlist in playlists.iter().filter(|p| p.is_owned_by(user_id)) {
        if is_excluded(playlist) {
            partition.excluded += 1;
        } else if playlist.id != target_id {
            partition.sources.push(playlist);
        }
    }

    partition
}

fn check_target(target: &Playlist) -> Result<()> {
    if is_excluded(target) {
        return Err(SyncError::Config(format!(
            "playlist '{}' is marked with '{EXCLUDE_DESCRIPTION_FLAG}' and cannot be the vault",
            target.name
        )));
    }
    Ok(())
}

/// Converges `target` to the union of all source playlists and `liked`.
///
/// Adds missing tracks and removes extraneous ones (every occurrence) in
/// batches of 100. The resulting order is unspecified. With `dry_run` the diff
/// is computed but nothing is written.
pub async fn aggregate_vault<A>(
    api: &A,
    user_id: &str,
    playlists: &[Playlist],
    liked: &[TrackId],
    target: &Playlist,
    dry_run: bool,
) -> Result<VaultOutcome>
where
    A: PlaylistApi + ?Sized,
{
    check_target(target)?;
    let partition = partition(playlists, user_id, &target.id);

    let mut collected: Vec<TrackId> = Vec::new();
    for source in &partition.sources {
        let ids = api.playlist_track_ids(&source.id).await?;
        log::debug!("Source '{}' has {} tracks", source.name, ids.len());
        collected.extend(ids);
    }
    collected.extend_from_slice(liked);
    let desired = dedup(&collected);

    let existing = api.playlist_track_ids(&target.id).await?;
    let diff = TrackDiff::between(&existing, &desired);

    log::info!(
        "Vault '{}': {} desired, {} present, +{} -{}",
        target.name,
        desired.len(),
        existing.len(),
        diff.to_add.len(),
        diff.to_remove.len()
    );

    if !dry_run {
        for batch in batches(&diff.to_add) {
            api.add_items(&target.id, batch).await?;
        }
        for batch in batches(&diff.to_remove) {
            api.remove_all_occurrences(&target.id, batch).await?;
        }
    }

    Ok(VaultOutcome {
        diff,
        excluded_playlists: partition.excluded,
        source_playlists: partition.sources.len(),
    })
}

/// Like [`aggregate_vault`], but the vault is rewritten newest first.
///
/// Each track keeps the `added_at` of its first sighting, liked tracks
/// before playlist items and sources in library order. The result is written
/// with [`mirror_exact`], so the vault holds every track once in time order.
pub async fn aggregate_vault_chronological<A>(
    api: &A,
    user_id: &str,
    playlists: &[Playlist],
    liked: &[SavedTrack],
    target: &Playlist,
    dry_run: bool,
) -> Result<VaultOutcome>
where
    A: PlaylistApi + ?Sized,
{
    check_target(target)?;
    let partition = partition(playlists, user_id, &target.id);

    let mut collected: Vec<SavedTrack> = liked.to_vec();
    for source in &partition.sources {
        let items = api.playlist_tracks(&source.id).await?;
        log::debug!("Source '{}' has {} tracks", source.name, items.len());
        collected.extend(items);
    }

    let mut seen = HashSet::new();
    collected.retain(|t| seen.insert(t.id.clone()));
    newest_first(&mut collected);
    let desired: Vec<TrackId> = collected.into_iter().map(|t| t.id).collect();

    let existing = api.playlist_track_ids(&target.id).await?;
    let diff = TrackDiff::between(&existing, &desired);

    log::info!(
        "Vault '{}' (newest first): {} tracks, +{} -{}",
        target.name,
        desired.len(),
        diff.to_add.len(),
        diff.to_remove.len()
    );

    if !dry_run {
        mirror_exact(api, &target.id, &desired).await?;
    }

    Ok(VaultOutcome {
        diff,
        excluded_playlists: partition.excluded,
        source_playlists: partition.sources.len(),
    })
}
