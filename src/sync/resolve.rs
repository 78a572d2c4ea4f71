use serde::Serialize;

use crate::{
    error::Result,
    spotify::PlaylistApi,
    types::Playlist,
};

/// Description prefix of playlists created by this tool.
pub const MANAGED_DESCRIPTION: &str = "Managed by vaultsync";

/// What to look for when resolving a managed playlist.
#[derive(Debug, Clone)]
pub struct PlaylistQuery<'a> {
    pub explicit_id: Option<&'a str>,
    pub tag: &'a str,
    pub name: &'a str,
    /// Visibility of the playlist if it has to be created
    pub public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    Id,
    Tag,
    Name,
    Created,
}

#[derive(Debug, Clone)]
pub struct ResolvedPlaylist {
    pub playlist: Playlist,
    pub matched_by: ResolvedBy,
    pub tag_appended: bool,
}

/// Case-insensitive tag lookup in a description.
pub fn has_tag(description: &str, tag: &str) -> bool {
    description.to_lowercase().contains(&tag.to_lowercase())
}

/// Appends `tag` to `description`, separated by a space, keeping existing text.
pub fn with_tag(description: &str, tag: &str) -> String {
    let description = description.trim_end();
    if description.is_empty() {
        tag.to_string()
    } else {
        format!("{description} {tag}")
    }
}

/// Finds an existing owned playlist for `query`.
///
/// Priority: explicit id, then tag in the description, then name
/// (both case-insensitive); the first rule that matches wins. Playlists owned
/// by someone else never match, so a foreign or unknown explicit id falls
/// through to the tag and name rules.
pub fn find_playlist<'p>(
    playlists: &'p [Playlist],
    user_id: &str,
    query: &PlaylistQuery<'_>,
) -> Option<(&'p Playlist, ResolvedBy)> {
    let owned = || playlists.iter().filter(|p| p.is_owned_by(user_id));

    query
        .explicit_id
        .and_then(|id| owned().find(|p| p.id == id))
        .map(|p| (p, ResolvedBy::Id))
        .or_else(|| {
            owned()
                .find(|p| has_tag(&p.description, query.tag))
                .map(|p| (p, ResolvedBy::Tag))
        })
        .or_else(|| {
            owned()
                .find(|p| p.name.to_lowercase() == query.name.to_lowercase())
                .map(|p| (p, ResolvedBy::Name))
        })
}

/// Finds or creates the playlist described by `query`.
///
/// A playlist matched by id or name that lacks the tag gets it appended to
/// its description. When nothing matches, a playlist named `query.name` is
/// created with the tag in its description.
pub async fn resolve_playlist<A>(
    api: &A,
    user_id: &str,
    playlists: &[Playlist],
    query: &PlaylistQuery<'_>,
) -> Result<ResolvedPlaylist>
where
    A: PlaylistApi + ?Sized,
{
    let found = find_playlist(playlists, user_id, query);
    if let Some(id) = query.explicit_id
        && !matches!(found, Some((_, ResolvedBy::Id)))
    {
        log::warn!("Playlist {id} is not one of your playlists, looking up by tag and name");
    }

    match found {
        Some((playlist, matched_by)) => {
            let mut playlist = playlist.clone();
            let mut tag_appended = false;

            if !has_tag(&playlist.description, query.tag) {
                let description = with_tag(&playlist.description, query.tag);
                api.update_description(&playlist.id, &description).await?;
                log::info!("Tagged playlist '{}' with {}", playlist.name, query.tag);
                playlist.description = description;
                tag_appended = true;
            }

            Ok(ResolvedPlaylist {
                playlist,
                matched_by,
                tag_appended,
            })
        }
        None => {
            let description = with_tag(MANAGED_DESCRIPTION, query.tag);
            let playlist = api
                .create_playlist(user_id, query.name, query.public, &description)
                .await?;
            log::info!("Created playlist '{}' ({})", playlist.name, playlist.id);

            Ok(ResolvedPlaylist {
                playlist,
                matched_by: ResolvedBy::Created,
                tag_appended: false,
            })
        }
    }
}
