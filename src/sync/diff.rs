use std::collections::HashSet;

use crate::{spotify::MAX_BATCH, types::TrackId};

/// Minimal set of changes that turns `existing` into `desired` (as sets).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDiff {
    /// `desired - existing`, in first-seen order of `desired`
    pub to_add: Vec<TrackId>,
    /// `existing - desired`, in first-seen order of `existing`
    pub to_remove: Vec<TrackId>,
}

impl TrackDiff {
    pub fn between(existing: &[TrackId], desired: &[TrackId]) -> Self {
        let existing_set: HashSet<&TrackId> = existing.iter().collect();
        let desired_set: HashSet<&TrackId> = desired.iter().collect();

        let to_add = dedup(desired.iter().filter(|id| !existing_set.contains(id)));
        let to_remove = dedup(existing.iter().filter(|id| !desired_set.contains(id)));

        Self { to_add, to_remove }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Drops repeated ids, keeping the first occurrence.
pub fn dedup<'a>(ids: impl IntoIterator<Item = &'a TrackId>) -> Vec<TrackId> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect()
}

/// Splits ids into consecutive write batches of at most 100.
pub fn batches(ids: &[TrackId]) -> std::slice::Chunks<'_, TrackId> {
    ids.chunks(MAX_BATCH)
}
