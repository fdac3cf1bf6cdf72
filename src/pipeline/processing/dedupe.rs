use crate::types::{NaturalKey, UnifiedEvent};
use std::collections::HashSet;
use tracing::info;

/// Outcome of one deduplication pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated {
    pub events: Vec<UnifiedEvent>,
    pub removed: usize,
}

/// Keep the first record seen for each natural key, preserving input order.
pub fn remove_duplicates(events: Vec<UnifiedEvent>) -> Deduplicated {
    let before = events.len();
    let mut seen: HashSet<NaturalKey> = HashSet::with_capacity(before);
    let events: Vec<UnifiedEvent> = events
        .into_iter()
        .filter(|event| seen.insert(event.natural_key()))
        .collect();

    let removed = before - events.len();
    if removed > 0 {
        info!("Removed {} duplicate records", removed);
    }
    Deduplicated { events, removed }
}
