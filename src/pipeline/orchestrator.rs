use super::processing::dedupe::remove_duplicates;
use super::report::{PersistOutcome, RunReport, RunReporter, SnapshotOutcome, SourceOutcome};
use super::snapshot::SnapshotWriter;
use crate::apis::base::SourceAdapter;
use crate::apis::factory::create_adapter;
use crate::app::ports::{CatalogStore, FetcherPort};
use crate::observability::metrics;
use crate::types::{Source, UnifiedEvent};
use chrono::Local;
use tracing::{error, info, info_span, instrument, warn};

/// One configured source: how to read it and where to fetch it.
pub struct SourceTarget {
    pub adapter: Box<dyn SourceAdapter>,
    pub url: String,
}

impl SourceTarget {
    pub fn new(source: Source, url: impl Into<String>) -> Self {
        Self {
            adapter: create_adapter(source),
            url: url.into(),
        }
    }
}

/// Runs fetch → adapt → dedupe → snapshot → persist → report, synchronously,
/// one source at a time.
pub struct Pipeline {
    sources: Vec<SourceTarget>,
    fetcher: Box<dyn FetcherPort>,
    store: Box<dyn CatalogStore>,
    snapshot: SnapshotWriter,
    reporter: RunReporter,
}

impl Pipeline {
    pub fn new(
        sources: Vec<SourceTarget>,
        fetcher: Box<dyn FetcherPort>,
        store: Box<dyn CatalogStore>,
        snapshot: SnapshotWriter,
        reporter: RunReporter,
    ) -> Self {
        Self {
            sources,
            fetcher,
            store,
            snapshot,
            reporter,
        }
    }

    /// Fetch and adapt one source. Failures are contained to this source.
    fn collect_source(&self, target: &SourceTarget) -> (Vec<UnifiedEvent>, SourceOutcome) {
        let source = target.adapter.source();
        let span = info_span!("source", source = %source);
        let _enter = span.enter();

        let payload = match self.fetcher.fetch_json(&target.url) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Fetch failed, skipping source: {}", e);
                metrics::sources::fetch_error(source.name());
                return (Vec::new(), SourceOutcome::FetchFailed(e.to_string()));
            }
        };

        match target.adapter.extract(&payload) {
            Ok(events) => {
                info!("Found {} {} events", events.len(), source);
                metrics::sources::events_adapted(source.name(), events.len());
                let n = events.len();
                (events, SourceOutcome::Adapted(n))
            }
            Err(e) => {
                warn!("{}", e);
                metrics::sources::shape_error(source.name());
                (Vec::new(), SourceOutcome::ShapeFailed(e.to_string()))
            }
        }
    }

    /// Execute one run and append its summary to the run log.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub fn run(&self) -> RunReport {
        let started_at = Local::now();
        info!("Starting pipeline run");

        let mut all_events = Vec::new();
        let mut outcomes = Vec::with_capacity(self.sources.len());
        for target in &self.sources {
            let (events, outcome) = self.collect_source(target);
            all_events.extend(events);
            outcomes.push((target.adapter.source(), outcome));
        }

        let deduped = remove_duplicates(all_events);
        metrics::duplicates_removed(deduped.removed);

        // Export before persisting so a store outage still leaves a snapshot
        let snapshot = match self.snapshot.write(&deduped.events, started_at) {
            Ok(path) => SnapshotOutcome::Written(path),
            Err(e) => {
                error!("Snapshot export failed: {}", e);
                SnapshotOutcome::Failed(e.to_string())
            }
        };

        let persistence = match self.store.insert_if_absent(&deduped.events) {
            Ok(n) => {
                metrics::catalog::inserted(n);
                PersistOutcome::Inserted(n)
            }
            Err(e) => {
                error!("Catalog write failed: {}", e);
                metrics::catalog::write_error();
                PersistOutcome::Failed(e.to_string())
            }
        };

        let report = RunReport {
            started_at,
            sources: outcomes,
            duplicates_removed: deduped.removed,
            total_after_dedup: deduped.events.len(),
            snapshot,
            persistence,
        };

        if let Err(e) = self.reporter.append(&report) {
            error!("Could not append run log {}: {}", self.reporter.path().display(), e);
        }
        metrics::pipeline_finished();
        info!(
            "Pipeline finished: {} events after dedup, {:?} newly inserted",
            report.total_after_dedup,
            report.inserted()
        );
        report
    }
}
