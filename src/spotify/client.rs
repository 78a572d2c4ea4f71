use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{Result, SyncError},
    spotify::{MAX_BATCH, PlaylistApi, RetryPolicy},
    types::{
        ChangePlaylistDetailsRequest, CreatePlaylistRequest, Page, Playlist, PlaylistItem,
        RemoveTracksRequest, SavedTrack, SavedTrackItem, TrackId, TrackUri, TrackUrisRequest,
        User,
    },
};

/// Web API session for one user.
///
/// Created with a bearer token at the start of a run (or request), used for
/// every call of that run and dropped afterwards.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    access_token: String,
    retry: RetryPolicy,
}

impl SpotifyClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the 30 second per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Sends one request under the retry policy.
    ///
    /// POST (create, append) is not idempotent: it is only retried when the
    /// request cannot have been applied, never after a timeout.
    async fn send(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response> {
        let retryable: fn(&SyncError) -> bool = if method == Method::POST {
            SyncError::is_retryable_write
        } else {
            SyncError::is_transient
        };

        self.retry
            .run_with(operation, retryable, || {
                let mut request = self
                    .http
                    .request(method.clone(), url)
                    .bearer_auth(&self.access_token);
                if let Some(body) = body {
                    request = request.json(body);
                }

                async move {
                    let response = request.send().await?;
                    self.check(response).await
                }
            })
            .await
    }

    async fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(self.retry.retry_after_header)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(2);
            return Err(SyncError::RateLimited { retry_after_secs });
        }

        let message = response.text().await.unwrap_or_default();
        Err(SyncError::from_status(status, message))
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, url: &str) -> Result<T> {
        let response = self.send(operation, Method::GET, url, None).await?;
        Ok(response.json::<T>().await?)
    }

    /// Follows `next` links until the listing is exhausted.
    async fn get_all<T: DeserializeOwned>(&self, operation: &str, first_url: String) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first_url);

        while let Some(url) = next {
            let page: Page<T> = self.get_json(operation, &url).await?;
            log::debug!("{operation}: fetched {} items", page.items.len());
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }

    async fn write(
        &self,
        operation: &str,
        method: Method,
        url: &str,
        body: Value,
    ) -> Result<()> {
        self.send(operation, method, url, Some(&body)).await?;
        Ok(())
    }
}

fn check_batch(ids: &[TrackId]) -> Result<()> {
    if ids.len() > MAX_BATCH {
        return Err(SyncError::BatchTooLarge { len: ids.len() });
    }
    Ok(())
}

fn uris(ids: &[TrackId]) -> Vec<String> {
    ids.iter().map(TrackId::uri).collect()
}

#[async_trait]
impl PlaylistApi for SpotifyClient {
    async fn current_user(&self) -> Result<User> {
        let url = format!("{uri}/me", uri = self.base_url);
        self.get_json("current user", &url).await
    }

    async fn current_user_playlists(&self) -> Result<Vec<Playlist>> {
        let url = format!("{uri}/me/playlists?limit=50", uri = self.base_url);
        self.get_all("list playlists", url).await
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<SavedTrack>> {
        let url = format!(
            "{uri}/playlists/{id}/tracks?fields=items(added_at,track(id)),next&limit=100",
            uri = self.base_url,
            id = playlist_id
        );
        let items: Vec<PlaylistItem> = self.get_all("playlist tracks", url).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let id = item.track.and_then(|t| t.id)?;
                Some(SavedTrack {
                    id: TrackId::new(id),
                    added_at: item.added_at.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn saved_tracks(&self) -> Result<Vec<SavedTrack>> {
        let url = format!("{uri}/me/tracks?limit=50", uri = self.base_url);
        let items: Vec<SavedTrackItem> = self.get_all("liked tracks", url).await?;

        Ok(items
            .into_iter()
            .filter_map(|item| {
                let id = item.track.and_then(|t| t.id)?;
                Some(SavedTrack {
                    id: TrackId::new(id),
                    added_at: item.added_at.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<Playlist> {
        let url = format!(
            "{uri}/users/{user_id}/playlists",
            uri = self.base_url,
            user_id = user_id
        );
        let body = serde_json::to_value(CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public,
            collaborative: false,
        })?;

        let response = self
            .send("create playlist", Method::POST, &url, Some(&body))
            .await?;
        Ok(response.json::<Playlist>().await?)
    }

    async fn update_description(&self, playlist_id: &str, description: &str) -> Result<()> {
        let url = format!("{uri}/playlists/{id}", uri = self.base_url, id = playlist_id);
        let body = serde_json::to_value(ChangePlaylistDetailsRequest {
            description: description.to_string(),
        })?;
        self.write("update description", Method::PUT, &url, body).await
    }

    async fn replace_items(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()> {
        check_batch(ids)?;
        let url = format!("{uri}/playlists/{id}/tracks", uri = self.base_url, id = playlist_id);
        let body = serde_json::to_value(TrackUrisRequest { uris: uris(ids) })?;
        self.write("replace items", Method::PUT, &url, body).await
    }

    async fn add_items(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()> {
        check_batch(ids)?;
        let url = format!("{uri}/playlists/{id}/tracks", uri = self.base_url, id = playlist_id);
        let body = serde_json::to_value(TrackUrisRequest { uris: uris(ids) })?;
        self.write("add items", Method::POST, &url, body).await
    }

    async fn remove_all_occurrences(&self, playlist_id: &str, ids: &[TrackId]) -> Result<()> {
        check_batch(ids)?;
        let url = format!("{uri}/playlists/{id}/tracks", uri = self.base_url, id = playlist_id);
        let body = serde_json::to_value(RemoveTracksRequest {
            tracks: uris(ids).into_iter().map(|uri| TrackUri { uri }).collect(),
        })?;
        self.write("remove items", Method::DELETE, &url, body).await
    }
}
