use tabled::Table;

use crate::{
    config::Settings,
    error,
    spotify::PlaylistApi,
    sync::{self, LIKED_TAG, VAULT_TAG},
    types::{Playlist, PlaylistTableRow},
    warning,
};

/// Prints the user's playlists and what the sync does with each of them.
pub async fn playlists(settings: &Settings) {
    let client = super::client(settings, false).await;

    let pb = super::spinner("Fetching playlists...");
    let result = async {
        let me = client.current_user().await?;
        let playlists = client.current_user_playlists().await?;
        Ok::<_, crate::error::SyncError>((me, playlists))
    }
    .await;
    pb.finish_and_clear();

    let (me, playlists) = match result {
        Ok(res) => res,
        Err(e) => error!("Failed to load playlists: {}", e),
    };

    let rows: Vec<PlaylistTableRow> = playlists
        .iter()
        .filter(|p| p.is_owned_by(&me.id))
        .map(|p| PlaylistTableRow {
            name: p.name.clone(),
            role: role(p, settings).to_string(),
            tracks: p.tracks.total,
            id: p.id.clone(),
        })
        .collect();

    if rows.is_empty() {
        warning!("No playlists owned by {}", me.name());
        return;
    }

    println!("{}", Table::new(rows));
}

fn role(playlist: &Playlist, settings: &Settings) -> &'static str {
    let is_named = |name: &str| playlist.name.to_lowercase() == name.to_lowercase();

    if sync::is_excluded(playlist) {
        "excluded"
    } else if sync::has_tag(&playlist.description, VAULT_TAG) || is_named(&settings.vault_playlist_name) {
        "vault"
    } else if sync::has_tag(&playlist.description, LIKED_TAG) || is_named(&settings.mirror_playlist_name) {
        "mirror"
    } else {
        "source"
    }
}
