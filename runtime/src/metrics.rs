//! Prometheus metrics for the ledger engine.
//!
//! Metric names used by the engine:
//! - `engine_actions_total`: actions received
//! - `engine_actions_rejected_total`: actions refused by the reducer
//! - `engine_snapshot_commits_total`: snapshots persisted
//! - `engine_snapshot_conflicts_total`: compare-and-swap saves that lost the race
//! - `engine_anomalies_total`: anomaly effects reported by reducers
//! - `engine_reducer_duration_seconds`: reducer execution time
//!
//! # Example
//!
//! ```rust,no_run
//! use slotbook_runtime::metrics::MetricsExporter;
//!
//! let mut exporter = MetricsExporter::new();
//! exporter.install()?;
//! // ... run the engine ...
//! if let Some(text) = exporter.render() {
//!     println!("{text}");
//! }
//! # Ok::<(), slotbook_runtime::metrics::MetricsError>(())
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics exporter.
///
/// Installs a global recorder and renders the scrape text on demand. Serving
/// the text over HTTP is left to the embedding application.
#[derive(Default)]
pub struct MetricsExporter {
    handle: Option<PrometheusHandle>,
}

impl MetricsExporter {
    /// Create an exporter that has not been installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// Only one global recorder can exist per process. If one is already
    /// installed (e.g., in tests), this logs a warning and succeeds without a
    /// handle.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the exporter hasn't been installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!("engine_actions_total", "Total number of actions sent to the engine");
    describe_counter!(
        "engine_actions_rejected_total",
        "Total number of actions refused by the reducer"
    );
    describe_counter!(
        "engine_snapshot_commits_total",
        "Total number of snapshots persisted"
    );
    describe_counter!(
        "engine_snapshot_conflicts_total",
        "Total number of version-checked saves rejected by the store"
    );
    describe_counter!(
        "engine_anomalies_total",
        "Total number of anomalies reported by reducers"
    );
    describe_histogram!(
        "engine_reducer_duration_seconds",
        "Time taken to execute the reducer"
    );
}

/// Engine metrics recorder.
pub struct EngineMetrics;

impl EngineMetrics {
    /// Record a received action.
    pub fn record_action() {
        counter!("engine_actions_total").increment(1);
    }

    /// Record a refused action.
    pub fn record_rejection() {
        counter!("engine_actions_rejected_total").increment(1);
    }

    /// Record reducer execution time.
    pub fn record_reducer_duration(duration: Duration) {
        histogram!("engine_reducer_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a persisted snapshot.
    pub fn record_commit() {
        counter!("engine_snapshot_commits_total").increment(1);
    }

    /// Record a lost compare-and-swap race.
    pub fn record_conflict() {
        counter!("engine_snapshot_conflicts_total").increment(1);
    }

    /// Record an anomaly effect.
    pub fn record_anomaly(kind: &str) {
        counter!("engine_anomalies_total", "kind" => kind.to_string()).increment(1);
    }
}
