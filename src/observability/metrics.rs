//! Prometheus metrics for pipeline runs and the read API.
//!
//! Recording functions are grouped by phase. Without an installed recorder
//! they are no-ops, so the scraper can run without an exporter.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use crate::error::{Result, ScraperError};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();
static DESCRIBED: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    SourceEventsAdapted,
    SourceFetchErrors,
    SourceShapeErrors,
    DedupRemoved,
    CatalogInserted,
    CatalogErrors,
    PipelineLastRun,
    ApiRequests,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::SourceEventsAdapted => "partner_events_source_events_total",
            MetricName::SourceFetchErrors => "partner_events_source_fetch_errors_total",
            MetricName::SourceShapeErrors => "partner_events_source_shape_errors_total",
            MetricName::DedupRemoved => "partner_events_dedup_removed_total",
            MetricName::CatalogInserted => "partner_events_catalog_inserted_total",
            MetricName::CatalogErrors => "partner_events_catalog_errors_total",
            MetricName::PipelineLastRun => "partner_events_pipeline_last_run_timestamp_seconds",
            MetricName::ApiRequests => "partner_events_api_requests_total",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            MetricName::SourceEventsAdapted => "Events produced by a source adapter.",
            MetricName::SourceFetchErrors => "Source payloads that could not be fetched.",
            MetricName::SourceShapeErrors => "Source payloads missing their expected container.",
            MetricName::DedupRemoved => "Records dropped as duplicates within a run.",
            MetricName::CatalogInserted => "Rows newly written to the catalog.",
            MetricName::CatalogErrors => "Failed catalog write batches.",
            MetricName::PipelineLastRun => "Unix time the pipeline last finished.",
            MetricName::ApiRequests => "Requests served by the events API.",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        [
            MetricName::SourceEventsAdapted,
            MetricName::SourceFetchErrors,
            MetricName::SourceShapeErrors,
            MetricName::DedupRemoved,
            MetricName::CatalogInserted,
            MetricName::CatalogErrors,
            MetricName::PipelineLastRun,
            MetricName::ApiRequests,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn describe_all() {
    DESCRIBED.get_or_init(|| {
        for name in MetricName::all_metrics() {
            if name == MetricName::PipelineLastRun {
                describe_gauge!(name.as_str(), name.help());
            } else {
                describe_counter!(name.as_str(), name.help());
            }
        }
    });
}

/// Install the Prometheus recorder. Idempotent.
pub fn init() {
    HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus recorder installed");
            describe_all();
            handle
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            // Keep a detached recorder so /metrics still answers
            PrometheusBuilder::new().build_recorder().handle()
        }
    });
}

/// Current metrics in Prometheus text format, empty before [`init`].
pub fn render() -> String {
    HANDLE.get().map(|h| h.render()).unwrap_or_default()
}

/// Pushgateway grouping URL for this process's metrics.
pub fn push_url(gateway: &str, job: &str) -> String {
    format!("{}/metrics/job/{}", gateway.trim_end_matches('/'), job)
}

/// Send the current metrics to a Prometheus Pushgateway, replacing the job's
/// previous group.
pub fn push_to_gateway(gateway: &str, job: &str, timeout: Duration) -> Result<()> {
    let url = push_url(gateway, job);
    let body = render();
    let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
    let response = client
        .put(&url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()?;
    if !response.status().is_success() {
        return Err(ScraperError::Status {
            url,
            status: response.status().as_u16(),
        });
    }
    info!("Pushed run metrics to {}", url);
    Ok(())
}

pub mod sources {
    use super::MetricName;
    use metrics::counter;

    pub fn events_adapted(source: &'static str, n: usize) {
        counter!(MetricName::SourceEventsAdapted.as_str(), "source" => source).increment(n as u64);
    }

    pub fn fetch_error(source: &'static str) {
        counter!(MetricName::SourceFetchErrors.as_str(), "source" => source).increment(1);
    }

    pub fn shape_error(source: &'static str) {
        counter!(MetricName::SourceShapeErrors.as_str(), "source" => source).increment(1);
    }
}

pub mod catalog {
    use super::MetricName;
    use metrics::counter;

    pub fn inserted(n: usize) {
        counter!(MetricName::CatalogInserted.as_str()).increment(n as u64);
    }

    pub fn write_error() {
        counter!(MetricName::CatalogErrors.as_str()).increment(1);
    }
}

pub fn duplicates_removed(n: usize) {
    counter!(MetricName::DedupRemoved.as_str()).increment(n as u64);
}

pub fn pipeline_finished() {
    gauge!(MetricName::PipelineLastRun.as_str()).set(chrono::Utc::now().timestamp() as f64);
}

pub fn api_request(route: &'static str) {
    counter!(MetricName::ApiRequests.as_str(), "route" => route).increment(1);
}
