use crate::error::Result;
use crate::types::UnifiedEvent;
use serde_json::Value;

/// Retrieves one source's raw JSON document.
pub trait FetcherPort {
    fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// Persistent catalog of every event ever ingested.
///
/// Uniqueness of (title, start_date, source) is enforced by the store itself.
pub trait CatalogStore {
    /// Total rows currently persisted.
    fn count(&self) -> Result<u64>;

    /// Insert every record whose natural key is not already present and return
    /// how many rows were newly written. Existing keys are skipped silently.
    fn insert_if_absent(&self, events: &[UnifiedEvent]) -> Result<usize>;
}
