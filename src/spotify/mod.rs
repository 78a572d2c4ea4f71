//! # Spotify Integration Module
//!
//! Thin layer over the Spotify Web API used by the reconciler.
//!
//! ## Modules
//!
//! - [`auth`] - OAuth 2.0 PKCE login, code exchange and token refresh
//! - [`gateway`] - The [`PlaylistApi`] trait the reconciler is written against
//! - [`client`] - [`SpotifyClient`], the reqwest implementation of [`PlaylistApi`]
//! - [`retry`] - [`RetryPolicy`], applied uniformly to every API call
//!
//! ## API Coverage
//!
//! ### Reads (paginated by following `next`)
//! - `GET /me` - Current user
//! - `GET /me/playlists` - User's playlists, 50 per page
//! - `GET /playlists/{id}/tracks` - Playlist track ids, 100 per page
//! - `GET /me/tracks` - Liked tracks with `added_at`, 50 per page
//!
//! ### Writes (at most 100 ids per call)
//! - `POST /users/{user_id}/playlists` - Create playlist
//! - `PUT /playlists/{id}` - Update description
//! - `PUT /playlists/{id}/tracks` - Replace all items
//! - `POST /playlists/{id}/tracks` - Append items
//! - `DELETE /playlists/{id}/tracks` - Remove all occurrences of items
//!
//! ### Authentication
//! - `POST /api/token` - Token exchange and refresh operations
//!
//! ## Rate Limiting
//!
//! A `429 Too Many Requests` answer is retried after the `Retry-After` delay,
//! never less than two seconds. Connection errors and 5xx answers back off
//! exponentially (1s doubling to 16s) for up to five attempts by default.

pub mod auth;
pub mod client;
pub mod gateway;
pub mod retry;

pub use client::SpotifyClient;
pub use gateway::{MAX_BATCH, PlaylistApi};
pub use retry::RetryPolicy;
