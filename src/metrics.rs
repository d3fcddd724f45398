use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_records_total",
            "Raw records received by the ingestor."
        );
        describe_counter!(
            "ingest_dropped_total",
            "Records rejected at ingestion, by reason."
        );
        describe_histogram!("ingest_parse_ms", "Snapshot document parse time in milliseconds.");
        describe_counter!("engine_runs_total", "Completed engine evaluations.");
        describe_counter!(
            "engine_branch_errors_total",
            "Failed fan-out branches, by branch."
        );
        describe_counter!("engine_alerts_total", "Alerts emitted, by kind.");
        describe_histogram!("engine_run_ms", "Engine evaluation time in milliseconds.");
        describe_gauge!(
            "engine_last_run_ts",
            "Unix ts of the last engine evaluation."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder for this process.
    pub fn init() -> Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
