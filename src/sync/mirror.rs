use crate::{
    error::Result,
    spotify::{MAX_BATCH, PlaylistApi},
    sync::diff::batches,
    types::{SavedTrack, TrackId},
};

/// What [`mirror_exact`] did to the playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorOutcome {
    pub total: usize,
    pub replace_calls: usize,
    pub append_calls: usize,
    /// The empty replace failed and the playlist was emptied item by item
    pub cleared_by_fallback: bool,
}

/// Orders liked tracks newest first, like the Liked Songs page.
///
/// `added_at` is an ISO-8601 timestamp, so string order is time order. Ties
/// keep the order the API returned them in.
pub fn newest_first(tracks: &mut [SavedTrack]) {
    tracks.sort_by(|a, b| b.added_at.cmp(&a.added_at));
}

/// Makes the playlist contain exactly `desired`, in that order.
///
/// The first 100 ids replace the whole playlist in one call, the rest are
/// appended in batches of 100. An empty `desired` clears the playlist; if
/// that fails, current contents are removed batch by batch instead. A failed
/// batch aborts the run and leaves earlier batches applied.
pub async fn mirror_exact<A>(api: &A, playlist_id: &str, desired: &[TrackId]) -> Result<MirrorOutcome>
where
    A: PlaylistApi + ?Sized,
{
    let mut outcome = MirrorOutcome {
        total: desired.len(),
        ..Default::default()
    };

    if desired.is_empty() {
        if let Err(e) = api.replace_items(playlist_id, &[]).await {
            log::warn!("Clearing playlist {playlist_id} failed ({e}), removing items instead");
            let existing = api.playlist_track_ids(playlist_id).await?;
            for batch in batches(&existing) {
                api.remove_all_occurrences(playlist_id, batch).await?;
            }
            outcome.cleared_by_fallback = true;
        } else {
            outcome.replace_calls = 1;
        }
        return Ok(outcome);
    }

    let (head, tail) = desired.split_at(desired.len().min(MAX_BATCH));
    api.replace_items(playlist_id, head).await?;
    outcome.replace_calls = 1;

    for batch in batches(tail) {
        api.add_items(playlist_id, batch).await?;
        outcome.append_calls += 1;
    }

    log::debug!(
        "Mirrored {} tracks into {playlist_id} with {} append calls",
        outcome.total,
        outcome.append_calls
    );
    Ok(outcome)
}
