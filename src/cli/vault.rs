use crate::{
    config::Settings,
    error, info, success,
    sync::{self, ResolvedBy, VaultOptions},
    warning,
};

pub async fn vault(settings: &Settings, options: VaultOptions, unbounded_retries: bool) {
    let client = super::client(settings, unbounded_retries).await;

    let pb = super::spinner("Aggregating playlists into the vault...");
    let result = sync::run_vault(&client, &options).await;
    pb.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => error!("Vault run failed: {}", e),
    };

    if summary.resolved_by == ResolvedBy::Created {
        info!("Created vault playlist '{}'", summary.playlist_name);
    }
    info!(
        "{} source playlists, {} excluded",
        summary.source_playlists, summary.excluded_playlists
    );
    if summary.chronological {
        info!("Ordering '{}' newest first", summary.playlist_name);
    }

    if summary.dry_run {
        warning!(
            "Dry run: would add {} and remove {} tracks in '{}'",
            summary.added,
            summary.removed,
            summary.playlist_name
        );
    } else {
        success!(
            "Vault '{}' updated: {} added, {} removed",
            summary.playlist_name,
            summary.added,
            summary.removed
        );
    }
}
