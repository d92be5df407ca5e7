//! Metrics for the webinar refresh pipeline.
//!
//! Recording goes through the `metrics` facade. `init` installs a Prometheus
//! recorder whose rendered text can be pushed to a Pushgateway at the end of a
//! run with [`push_to_gateway`]. Without an installed recorder every call here
//! is a no-op, which is what unit tests rely on.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

use crate::common::error::Result;

/// Every metric name the pipeline records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Extractor metrics
    ExtractSuccess,
    ExtractFailure,
    ExtractRecords,
    ExtractInvalidRecords,

    // Reconciliation metrics
    StatusCorrections,

    // Merge metrics
    MergeRecordsAdded,
    MergeRecordsUpdated,
    MergeRecordsRemoved,

    // Run outcome metrics
    RefreshRunsWritten,
    RefreshRunsSkipped,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ExtractSuccess => "webinars_extract_success_total",
            MetricName::ExtractFailure => "webinars_extract_failure_total",
            MetricName::ExtractRecords => "webinars_extract_records_total",
            MetricName::ExtractInvalidRecords => "webinars_extract_invalid_records_total",
            MetricName::StatusCorrections => "webinars_status_corrections_total",
            MetricName::MergeRecordsAdded => "webinars_merge_records_added_total",
            MetricName::MergeRecordsUpdated => "webinars_merge_records_updated_total",
            MetricName::MergeRecordsRemoved => "webinars_merge_records_removed_total",
            MetricName::RefreshRunsWritten => "webinars_refresh_runs_written_total",
            MetricName::RefreshRunsSkipped => "webinars_refresh_runs_skipped_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            ExtractSuccess,
            ExtractFailure,
            ExtractRecords,
            ExtractInvalidRecords,
            StatusCorrections,
            MergeRecordsAdded,
            MergeRecordsUpdated,
            MergeRecordsRemoved,
            RefreshRunsWritten,
            RefreshRunsSkipped,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Install the global Prometheus recorder
pub fn init() -> std::result::Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Metrics system initialized");
    Ok(handle)
}

/// Push the current snapshot to a Prometheus Pushgateway under `job`
pub async fn push_to_gateway(
    handle: &PrometheusHandle,
    pushgateway_url: &str,
    job: &str,
) -> Result<()> {
    let body = handle.render();
    let push_url = format!("{}/metrics/job/{}", pushgateway_url.trim_end_matches('/'), job);

    reqwest::Client::new()
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await?
        .error_for_status()?;

    info!("Pushed metrics to Pushgateway for job={}", job);
    Ok(())
}

// ============================================================================
// Extractor Metrics
// ============================================================================

pub mod extract {
    use super::MetricName;

    pub fn success(source: &str) {
        ::metrics::counter!(MetricName::ExtractSuccess.as_str(), "source" => source.to_string())
            .increment(1);
    }

    pub fn failure(source: &str) {
        ::metrics::counter!(MetricName::ExtractFailure.as_str(), "source" => source.to_string())
            .increment(1);
    }

    /// Valid records a source contributed to the snapshot
    pub fn records(source: &str, count: usize) {
        ::metrics::counter!(MetricName::ExtractRecords.as_str(), "source" => source.to_string())
            .increment(count as u64);
    }

    pub fn invalid_records(source: &str, count: usize) {
        let name = MetricName::ExtractInvalidRecords.as_str();
        ::metrics::counter!(name, "source" => source.to_string()).increment(count as u64);
    }
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

pub mod reconcile {
    use super::MetricName;

    pub fn status_corrected(source: &str) {
        let name = MetricName::StatusCorrections.as_str();
        ::metrics::counter!(name, "source" => source.to_string()).increment(1);
    }
}

// ============================================================================
// Merge Metrics
// ============================================================================

pub mod merge {
    use super::MetricName;

    pub fn records_added(count: usize) {
        ::metrics::counter!(MetricName::MergeRecordsAdded.as_str()).increment(count as u64);
    }

    pub fn records_updated(count: usize) {
        ::metrics::counter!(MetricName::MergeRecordsUpdated.as_str()).increment(count as u64);
    }

    pub fn records_removed(count: usize) {
        ::metrics::counter!(MetricName::MergeRecordsRemoved.as_str()).increment(count as u64);
    }
}

// ============================================================================
// Refresh Run Metrics
// ============================================================================

pub mod refresh {
    use super::MetricName;

    pub fn run_written() {
        ::metrics::counter!(MetricName::RefreshRunsWritten.as_str()).increment(1);
    }

    pub fn run_skipped() {
        ::metrics::counter!(MetricName::RefreshRunsSkipped.as_str()).increment(1);
    }
}
