// Scrape pipeline: per-source adaptation, dedup, export and persistence

pub mod orchestrator;
pub mod processing;
pub mod report;
pub mod snapshot;

pub use orchestrator::{Pipeline, SourceTarget};
pub use report::{PersistOutcome, RunReport, RunReporter, SnapshotOutcome, SourceOutcome};
pub use snapshot::SnapshotWriter;
