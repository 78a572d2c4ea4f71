mod common;

use std::collections::HashSet;

use common::{Call, FakeSpotify, ids, numbered};
use vaultsync::{
    error::SyncError,
    sync::{
        LIKED_TAG, MirrorOptions, ResolvedBy, VAULT_TAG, VaultOptions, run_liked_mirror, run_vault,
    },
    types::TrackId,
};

fn vault_options() -> VaultOptions {
    VaultOptions {
        playlist_name: "_vaulted".into(),
        playlist_id: None,
        dry_run: false,
        chronological: false,
    }
}

fn mirror_options() -> MirrorOptions {
    MirrorOptions {
        playlist_name: "Liked Songs Mirror".into(),
        playlist_id: None,
        public: false,
        dry_run: false,
        verify: true,
    }
}

fn as_set(tracks: &[TrackId]) -> HashSet<TrackId> {
    tracks.iter().cloned().collect()
}

fn newest_first(mut tracks: Vec<TrackId>) -> Vec<TrackId> {
    tracks.reverse();
    tracks
}

#[tokio::test]
async fn vault_becomes_union_of_sources_and_liked() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, ids(&["old", "a"]))
        .with_playlist("road", "Road trip", "", ids(&["a", "b"]))
        .with_playlist("focus", "Focus", "deep work", ids(&["c", "b"]))
        .with_liked(ids(&["d", "a"]));

    let summary = run_vault(&api, &vault_options()).await.unwrap();

    assert_eq!(summary.resolved_by, ResolvedBy::Tag);
    assert_eq!(summary.added, 3);
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.source_playlists, 2);
    assert_eq!(as_set(&api.contents("vault")), as_set(&ids(&["a", "b", "c", "d"])));
}

#[tokio::test]
async fn second_vault_run_writes_nothing() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, ids(&["x"]))
        .with_playlist("road", "Road trip", "", numbered("r", 130))
        .with_liked(ids(&["l1", "l2"]));

    run_vault(&api, &vault_options()).await.unwrap();
    api.clear_calls();

    let summary = run_vault(&api, &vault_options()).await.unwrap();

    assert_eq!((summary.added, summary.removed), (0, 0));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn excluded_playlists_stay_out_of_the_vault() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, Vec::new())
        .with_playlist("road", "Road trip", "", ids(&["a"]))
        .with_playlist("sleep", "Sleep", "white noise -*", ids(&["noise"]))
        .with_playlist("kids", "Kids", "-*", ids(&["lullaby", "a"]))
        .with_owned_playlist("friend", "theirs", "Friend's mix", "", ids(&["foreign"]));

    let summary = run_vault(&api, &vault_options()).await.unwrap();
    let vault = as_set(&api.contents("vault"));

    assert_eq!(summary.excluded_playlists, 2);
    assert_eq!(summary.source_playlists, 1);
    assert_eq!(vault, as_set(&ids(&["a"])));
    assert!(!vault.contains(&TrackId::new("noise")));
    assert!(!vault.contains(&TrackId::new("foreign")));
}

#[tokio::test]
async fn flagged_vault_is_rejected() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", "[vaultsync:vault] -*", Vec::new())
        .with_playlist("road", "Road trip", "", ids(&["a"]));

    let err = run_vault(&api, &vault_options()).await.unwrap_err();

    assert!(matches!(err, SyncError::Config(_)));
    assert!(api.writes().is_empty());
}

#[tokio::test]
async fn vault_adds_in_batches_of_100_in_order() {
    let sources = numbered("t", 250);
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, Vec::new())
        .with_playlist("big", "Big", "", sources.clone());

    run_vault(&api, &vault_options()).await.unwrap();

    let adds: Vec<Vec<TrackId>> = api
        .writes()
        .into_iter()
        .map(|call| match call {
            Call::Add { ids, .. } => ids,
            other => panic!("unexpected write {other:?}"),
        })
        .collect();

    assert_eq!(adds.iter().map(Vec::len).collect::<Vec<_>>(), vec![100, 100, 50]);
    assert_eq!(adds.concat(), sources);
}

#[tokio::test]
async fn vault_dry_run_only_reports() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, ids(&["gone"]))
        .with_playlist("road", "Road trip", "", ids(&["a", "b"]));

    let options = VaultOptions {
        dry_run: true,
        ..vault_options()
    };
    let summary = run_vault(&api, &options).await.unwrap();

    assert_eq!((summary.added, summary.removed), (2, 1));
    assert!(summary.dry_run);
    assert!(api.writes().is_empty());
    assert_eq!(api.contents("vault"), ids(&["gone"]));
}

#[tokio::test]
async fn vault_is_created_when_missing() {
    let api = FakeSpotify::new().with_playlist("road", "Road trip", "", ids(&["a"]));

    let summary = run_vault(&api, &vault_options()).await.unwrap();

    assert_eq!(summary.resolved_by, ResolvedBy::Created);
    assert_eq!(api.playlist_count(), 2);
    assert!(api.description(&summary.playlist_id).contains(VAULT_TAG));
    assert_eq!(api.contents(&summary.playlist_id), ids(&["a"]));
    assert!(api.calls().contains(&Call::Create {
        name: "_vaulted".into(),
        public: false,
    }));
}

#[tokio::test]
async fn explicit_id_beats_name_and_gets_tagged() {
    let api = FakeSpotify::new()
        .with_playlist("named", "_vaulted", "", Vec::new())
        .with_playlist("chosen", "My archive", "everything", Vec::new());

    let options = VaultOptions {
        playlist_id: Some("chosen".into()),
        ..vault_options()
    };
    let summary = run_vault(&api, &options).await.unwrap();

    assert_eq!(summary.playlist_id, "chosen");
    assert_eq!(summary.resolved_by, ResolvedBy::Id);
    assert_eq!(api.description("chosen"), format!("everything {VAULT_TAG}"));
    assert_eq!(api.description("named"), "");
}

#[tokio::test]
async fn tag_beats_name() {
    let api = FakeSpotify::new()
        .with_playlist("named", "_vaulted", "", Vec::new())
        .with_playlist("tagged", "Archive", VAULT_TAG, Vec::new());

    let summary = run_vault(&api, &vault_options()).await.unwrap();

    assert_eq!(summary.playlist_id, "tagged");
    assert_eq!(summary.resolved_by, ResolvedBy::Tag);
}

#[tokio::test]
async fn unknown_explicit_id_falls_back_to_tag() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, Vec::new())
        .with_playlist("road", "Road trip", "", ids(&["a"]));

    let options = VaultOptions {
        playlist_id: Some("does-not-exist".into()),
        ..vault_options()
    };
    let summary = run_vault(&api, &options).await.unwrap();

    assert_eq!(summary.playlist_id, "vault");
    assert_eq!(summary.resolved_by, ResolvedBy::Tag);
    assert_eq!(api.contents("vault"), ids(&["a"]));
}

#[tokio::test]
async fn foreign_explicit_id_falls_back_to_creating() {
    let api = FakeSpotify::new()
        .with_owned_playlist("friend", "theirs", "Friend's mix", "", ids(&["foreign"]))
        .with_playlist("road", "Road trip", "", ids(&["a"]));

    let options = VaultOptions {
        playlist_id: Some("theirs".into()),
        ..vault_options()
    };
    let summary = run_vault(&api, &options).await.unwrap();

    assert_eq!(summary.resolved_by, ResolvedBy::Created);
    assert_ne!(summary.playlist_id, "theirs");
    assert_eq!(api.contents("theirs"), ids(&["foreign"]));
    assert_eq!(api.contents(&summary.playlist_id), ids(&["a"]));
}

#[tokio::test]
async fn liked_mirror_replaces_stale_contents_in_one_call() {
    let api = FakeSpotify::new()
        .with_playlist("mirror", "Liked Songs Mirror", LIKED_TAG, ids(&["Z"]))
        .with_liked(ids(&["C", "B", "A"]));

    let summary = run_liked_mirror(&api, &mirror_options()).await.unwrap();

    assert_eq!(
        api.writes(),
        vec![Call::Replace {
            playlist: "mirror".into(),
            ids: ids(&["A", "B", "C"]),
        }]
    );
    assert_eq!((summary.added, summary.removed), (3, 1));
    assert_eq!(summary.final_count, Some(3));
}

#[tokio::test]
async fn liked_mirror_is_exact_for_all_sizes() {
    for n in [0usize, 1, 100, 250] {
        let liked = numbered("t", n);
        let api = FakeSpotify::new()
            .with_playlist("mirror", "Liked Songs Mirror", LIKED_TAG, ids(&["stale", "t0000"]))
            .with_liked(liked.clone());

        let summary = run_liked_mirror(&api, &mirror_options()).await.unwrap();

        assert_eq!(api.contents("mirror"), newest_first(liked), "n = {n}");
        assert_eq!(summary.total_tracks, n);
        assert_eq!(summary.final_count, Some(n));

        let writes = api.writes();
        assert!(matches!(writes.first(), Some(Call::Replace { .. })), "n = {n}");
        let appends = writes.iter().filter(|c| matches!(c, Call::Add { .. })).count();
        assert_eq!(appends, n.saturating_sub(100).div_ceil(100), "n = {n}");
    }
}

#[tokio::test]
async fn liked_mirror_rewrites_when_only_order_differs() {
    let api = FakeSpotify::new()
        .with_playlist("mirror", "Liked Songs Mirror", LIKED_TAG, ids(&["a", "b"]))
        .with_liked(ids(&["a", "b"]));

    run_liked_mirror(&api, &mirror_options()).await.unwrap();

    assert_eq!(api.contents("mirror"), ids(&["b", "a"]));
}

#[tokio::test]
async fn failing_clear_falls_back_to_batched_removal() {
    let api = FakeSpotify::new()
        .with_playlist("mirror", "Liked Songs Mirror", LIKED_TAG, numbered("old", 150))
        .failing_empty_replace();

    let summary = run_liked_mirror(&api, &mirror_options()).await.unwrap();

    let removals: Vec<usize> = api
        .writes()
        .into_iter()
        .filter_map(|c| match c {
            Call::Remove { ids, .. } => Some(ids.len()),
            _ => None,
        })
        .collect();

    assert_eq!(removals, vec![100, 50]);
    assert!(api.contents("mirror").is_empty());
    assert_eq!(summary.final_count, Some(0));
}

#[tokio::test]
async fn liked_mirror_is_created_with_requested_visibility() {
    let api = FakeSpotify::new().with_liked(ids(&["a"]));

    let options = MirrorOptions {
        public: true,
        ..mirror_options()
    };
    let summary = run_liked_mirror(&api, &options).await.unwrap();

    assert_eq!(summary.resolved_by, ResolvedBy::Created);
    assert!(api.calls().contains(&Call::Create {
        name: "Liked Songs Mirror".into(),
        public: true,
    }));
    assert!(api.description(&summary.playlist_id).contains(LIKED_TAG));
}

#[tokio::test]
async fn liked_mirror_dry_run_leaves_contents() {
    let api = FakeSpotify::new()
        .with_playlist("mirror", "Liked Songs Mirror", LIKED_TAG, ids(&["Z"]))
        .with_liked(ids(&["A"]));

    let options = MirrorOptions {
        dry_run: true,
        ..mirror_options()
    };
    let summary = run_liked_mirror(&api, &options).await.unwrap();

    assert!(api.writes().is_empty());
    assert_eq!(summary.final_count, None);
    assert_eq!((summary.added, summary.removed), (1, 1));
}

#[tokio::test]
async fn chronological_vault_is_rewritten_newest_first() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, ids(&["stale"]))
        .with_dated_playlist(
            "road",
            "Road trip",
            "",
            &[("a", "2023-05-01T00:00:00Z"), ("b", "2024-03-01T00:00:00Z")],
        )
        .with_dated_playlist(
            "focus",
            "Focus",
            "",
            &[("c", "2022-01-01T00:00:00Z"), ("a", "2024-06-01T00:00:00Z")],
        )
        .with_dated_playlist("sleep", "Sleep", "-*", &[("z", "2025-01-01T00:00:00Z")])
        .with_liked(ids(&["l1"]));

    let options = VaultOptions {
        chronological: true,
        ..vault_options()
    };
    let summary = run_vault(&api, &options).await.unwrap();

    assert!(summary.chronological);
    assert_eq!(summary.excluded_playlists, 1);
    assert_eq!(summary.source_playlists, 2);
    assert_eq!((summary.added, summary.removed), (4, 1));
    assert_eq!(api.contents("vault"), ids(&["b", "l1", "a", "c"]));
    assert_eq!(
        api.writes(),
        vec![Call::Replace {
            playlist: "vault".into(),
            ids: ids(&["b", "l1", "a", "c"]),
        }]
    );
}

#[tokio::test]
async fn chronological_vault_keeps_the_first_sighting() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, Vec::new())
        .with_dated_playlist("old", "Old", "", &[("a", "2020-01-01T00:00:00Z")])
        .with_dated_playlist(
            "new",
            "New",
            "",
            &[("b", "2021-01-01T00:00:00Z"), ("a", "2030-01-01T00:00:00Z")],
        );

    let options = VaultOptions {
        chronological: true,
        ..vault_options()
    };
    run_vault(&api, &options).await.unwrap();

    assert_eq!(api.contents("vault"), ids(&["b", "a"]));
}

#[tokio::test]
async fn chronological_vault_dry_run_writes_nothing() {
    let api = FakeSpotify::new()
        .with_playlist("vault", "_vaulted", VAULT_TAG, ids(&["a"]))
        .with_dated_playlist("road", "Road trip", "", &[("b", "2024-01-01T00:00:00Z")]);

    let options = VaultOptions {
        chronological: true,
        dry_run: true,
        ..vault_options()
    };
    let summary = run_vault(&api, &options).await.unwrap();

    assert_eq!((summary.added, summary.removed), (1, 1));
    assert!(api.writes().is_empty());
}
