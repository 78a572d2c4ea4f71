use async_trait::async_trait;

use crate::{
    error::Result,
    types::{Playlist, SavedTrack, TrackId, User},
};

/// Largest number of items a single playlist write may carry.
pub const MAX_BATCH: usize = 100;

/// The slice of the Web API the reconciler needs.
///
/// Readers return fully paginated results and skip items without a track id.
/// Writers accept at most [`MAX_BATCH`] ids per call; callers chunk.
#[async_trait]
pub trait PlaylistApi: Send + Sync {
    async fn current_user(&self) -> Result<User>;

    /// Every playlist in the current user's library, owned or followed.
    async fn current_user_playlists(&self) -> Result<Vec<Playlist>>;

    /// Items of a playlist, top to bottom, with the time each was added.
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<SavedTrack>>;

    /// Track ids of a playlist, top to bottom.
    async fn playlist_track_ids(&self, playlist_id: &str) -> Result<Vec<TrackId>> {
        Ok(self
            .playlist_tracks(playlist_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect())
    }

    /// Liked tracks in the order the API lists them.
    async fn saved_tracks(&self) -> Result<Vec<SavedTrack>>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<Playlist>;

    async fn update_description(&self, playlist_id: &str, description: &str) -> Result<()>;

    /// Overwrites the whole playlist with `ids`, order included.
    async fn replace_items(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()>;

    /// Appends `ids` at the end of the playlist.
    async fn add_items(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()>;

    /// Removes every occurrence of each id.
    async fn remove_all_occurrences(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()>;
}
