#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use vaultsync::{
    error::{Result, SyncError},
    spotify::{MAX_BATCH, PlaylistApi},
    types::{Owner, Playlist, SavedTrack, TracksRef, TrackId, User},
};

pub const ME: &str = "me";

/// A write the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { name: String, public: bool },
    Describe { playlist: String, description: String },
    Replace { playlist: String, ids: Vec<TrackId> },
    Add { playlist: String, ids: Vec<TrackId> },
    Remove { playlist: String, ids: Vec<TrackId> },
}

#[derive(Default)]
struct State {
    playlists: Vec<Playlist>,
    contents: HashMap<String, Vec<TrackId>>,
    added_at: HashMap<(String, TrackId), String>,
    liked: Vec<SavedTrack>,
    calls: Vec<Call>,
    created: usize,
    fail_empty_replace: bool,
}

/// In-memory Web API with a log of every write.
#[derive(Default)]
pub struct FakeSpotify {
    state: Mutex<State>,
}

pub fn ids(raw: &[&str]) -> Vec<TrackId> {
    raw.iter().map(|id| TrackId::new(*id)).collect()
}

/// `n` distinct track ids `t0000, t0001, ...`.
pub fn numbered(prefix: &str, n: usize) -> Vec<TrackId> {
    (0..n).map(|i| TrackId::new(format!("{prefix}{i:04}"))).collect()
}

impl FakeSpotify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(self, id: &str, name: &str, description: &str, tracks: Vec<TrackId>) -> Self {
        self.with_owned_playlist(ME, id, name, description, tracks)
    }

    pub fn with_owned_playlist(
        self,
        owner: &str,
        id: &str,
        name: &str,
        description: &str,
        tracks: Vec<TrackId>,
    ) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.playlists.push(Playlist {
                id: id.into(),
                name: name.into(),
                description: description.into(),
                owner: Owner { id: owner.into() },
                ..Default::default()
            });
            state.contents.insert(id.to_string(), tracks);
        }
        self
    }

    /// An owned playlist whose items carry the given `added_at` timestamps.
    pub fn with_dated_playlist(self, id: &str, name: &str, description: &str, items: &[(&str, &str)]) -> Self {
        let tracks = items.iter().map(|(track, _)| TrackId::new(*track)).collect();
        let this = self.with_playlist(id, name, description, tracks);
        {
            let mut state = this.state.lock().unwrap();
            for (track, added_at) in items {
                state
                    .added_at
                    .insert((id.to_string(), TrackId::new(*track)), added_at.to_string());
            }
        }
        this
    }

    /// Liked tracks, given oldest first; `added_at` grows by a minute per track.
    pub fn with_liked(self, tracks: Vec<TrackId>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.liked = tracks
                .into_iter()
                .enumerate()
                .map(|(i, id)| SavedTrack {
                    id,
                    added_at: format!("2024-01-01T{:02}:{:02}:00Z", i / 60, i % 60),
                })
                .collect();
        }
        self
    }

    pub fn failing_empty_replace(self) -> Self {
        self.state.lock().unwrap().fail_empty_replace = true;
        self
    }

    pub fn contents(&self, playlist_id: &str) -> Vec<TrackId> {
        self.state
            .lock()
            .unwrap()
            .contents
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn description(&self, playlist_id: &str) -> String {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .map(|p| p.description.clone())
            .unwrap_or_default()
    }

    pub fn playlist_count(&self) -> usize {
        self.state.lock().unwrap().playlists.len()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Content writes only (replace, add, remove).
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Replace { .. } | Call::Add { .. } | Call::Remove { .. }))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }
}

fn check_batch(ids: &[TrackId]) -> Result<()> {
    if ids.len() > MAX_BATCH {
        return Err(SyncError::BatchTooLarge { len: ids.len() });
    }
    Ok(())
}

fn not_found(playlist_id: &str) -> SyncError {
    SyncError::NotFound(format!("playlist {playlist_id}"))
}

#[async_trait]
impl PlaylistApi for FakeSpotify {
    async fn current_user(&self) -> Result<User> {
        Ok(User {
            id: ME.into(),
            display_name: Some("Me".into()),
        })
    }

    async fn current_user_playlists(&self) -> Result<Vec<Playlist>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .playlists
            .iter()
            .map(|p| Playlist {
                tracks: TracksRef {
                    total: state.contents.get(&p.id).map_or(0, |c| c.len() as u64),
                },
                ..p.clone()
            })
            .collect())
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<SavedTrack>> {
        let state = self.state.lock().unwrap();
        let contents = state
            .contents
            .get(playlist_id)
            .ok_or_else(|| not_found(playlist_id))?;
        Ok(contents
            .iter()
            .map(|id| SavedTrack {
                id: id.clone(),
                added_at: state
                    .added_at
                    .get(&(playlist_id.to_string(), id.clone()))
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn playlist_track_ids(&self, playlist_id: &str) -> Result<Vec<TrackId>> {
        self.state
            .lock()
            .unwrap()
            .contents
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| not_found(playlist_id))
    }

    async fn saved_tracks(&self) -> Result<Vec<SavedTrack>> {
        Ok(self.state.lock().unwrap().liked.clone())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<Playlist> {
        let mut state = self.state.lock().unwrap();
        state.created += 1;
        let playlist = Playlist {
            id: format!("created-{}", state.created),
            name: name.into(),
            description: description.into(),
            owner: Owner { id: user_id.into() },
            public: Some(public),
            ..Default::default()
        };
        state.playlists.push(playlist.clone());
        state.contents.insert(playlist.id.clone(), Vec::new());
        state.calls.push(Call::Create {
            name: name.into(),
            public,
        });
        Ok(playlist)
    }

    async fn update_description(&self, playlist_id: &str, description: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let playlist = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| not_found(playlist_id))?;
        playlist.description = description.into();
        state.calls.push(Call::Describe {
            playlist: playlist_id.into(),
            description: description.into(),
        });
        Ok(())
    }

    async fn replace_items(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()> {
        check_batch(ids)?;
        let mut state = self.state.lock().unwrap();
        if ids.is_empty() && state.fail_empty_replace {
            return Err(SyncError::Api {
                status: 400,
                message: "empty uris".into(),
            });
        }
        let contents = state
            .contents
            .get_mut(playlist_id)
            .ok_or_else(|| not_found(playlist_id))?;
        *contents = ids.to_vec();
        state.calls.push(Call::Replace {
            playlist: playlist_id.into(),
            ids: ids.to_vec(),
        });
        Ok(())
    }

    async fn add_items(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()> {
        check_batch(ids)?;
        let mut state = self.state.lock().unwrap();
        state
            .contents
            .get_mut(playlist_id)
            .ok_or_else(|| not_found(playlist_id))?
            .extend_from_slice(ids);
        state.calls.push(Call::Add {
            playlist: playlist_id.into(),
            ids: ids.to_vec(),
        });
        Ok(())
    }

    async fn remove_all_occurrences(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()> {
        check_batch(ids)?;
        let mut state = self.state.lock().unwrap();
        state
            .contents
            .get_mut(playlist_id)
            .ok_or_else(|| not_found(playlist_id))?
            .retain(|id| !ids.contains(id));
        state.calls.push(Call::Remove {
            playlist: playlist_id.into(),
            ids: ids.to_vec(),
        });
        Ok(())
    }
}
