use crate::{
    config::Settings,
    error, info, success,
    sync::{self, MirrorOptions, ResolvedBy},
    warning,
};

pub async fn liked(settings: &Settings, options: MirrorOptions, unbounded_retries: bool) {
    let client = super::client(settings, unbounded_retries).await;

    let pb = super::spinner("Mirroring liked songs...");
    let result = sync::run_liked_mirror(&client, &options).await;
    pb.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => error!("Liked songs mirror failed: {}", e),
    };

    if summary.resolved_by == ResolvedBy::Created {
        info!("Created mirror playlist '{}'", summary.playlist_name);
    }

    if summary.dry_run {
        warning!(
            "Dry run: '{}' would hold {} tracks ({} new, {} dropped)",
            summary.playlist_name,
            summary.total_tracks,
            summary.added,
            summary.removed
        );
        return;
    }

    success!(
        "Mirror '{}' holds {} liked tracks ({} new, {} dropped)",
        summary.playlist_name,
        summary.total_tracks,
        summary.added,
        summary.removed
    );

    match summary.final_count {
        Some(count) if count == summary.total_tracks => {
            success!("Verified: playlist length matches")
        }
        Some(count) => warning!(
            "Verification: playlist holds {} tracks, expected {}",
            count,
            summary.total_tracks
        ),
        None => {}
    }
}
