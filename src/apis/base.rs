use crate::error::Result;
use crate::types::{Source, UnifiedEvent};
use serde_json::Value;

/// Maps one source's raw JSON payload onto [`UnifiedEvent`]s.
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// A payload without the expected container is a
    /// [`crate::error::ScraperError::Shape`] error, which the pipeline records
    /// as zero events for the source. Missing fields on individual items never
    /// fail the batch.
    fn extract(&self, payload: &Value) -> Result<Vec<UnifiedEvent>>;
}
