//! # Engine
//! Fans one immutable [`Snapshot`] out to four independent branches
//! (ranking, alerts, trends, themes) and assembles the [`RunReport`].
//!
//! No I/O and no state between runs: the same snapshot, config and
//! evaluation time always give the same report. A branch that errors or
//! panics is reported in the diagnostics; the other three still deliver.

use chrono::{DateTime, Utc};
use metrics::{counter, gauge, histogram};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::alert::Alert;
use crate::analyze::{rank_sources, SourceScore};
use crate::anomaly::{detect_inactivity, detect_spikes};
use crate::config::EngineConfig;
use crate::error::{Branch, BranchError, ConfigError, DegenerateInput};
use crate::ingest::{ingest_records, types::ClassifiedPost, Snapshot};
use crate::metrics::ensure_metrics_described;
use crate::report::{RunDiagnostics, RunReport};
use crate::themes::{theme_distribution, ThemeDistribution};
use crate::trends::{daily_counts, Trends};

/// Validated configuration plus the branch computations. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Engine {
    cfg: Arc<EngineConfig>,
}

impl Engine {
    /// Fails fast on an invalid configuration.
    pub fn new(cfg: EngineConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Validate raw records into a snapshot using this engine's windows and taxonomy.
    pub fn ingest(&self, records: Vec<serde_json::Value>) -> Snapshot {
        ingest_records(records, &self.cfg)
    }

    pub fn snapshot_from_posts(&self, posts: Vec<ClassifiedPost>) -> Snapshot {
        Snapshot::from_posts(posts, &self.cfg)
    }

    pub fn rank(&self, snapshot: &Snapshot) -> Result<Vec<SourceScore>, BranchError> {
        rank_sources(
            snapshot.ranking_posts(),
            self.cfg.window_days,
            &self.cfg.weights,
            self.cfg.theme_catalog_size,
        )
        .map_err(|e| BranchError::new(Branch::Ranking, e.to_string()))
    }

    /// Spike alerts (ranking window) followed by inactivity alerts (all posts).
    pub fn alerts(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> Result<Vec<Alert>, BranchError> {
        let mut alerts = detect_spikes(snapshot.ranking_posts(), self.cfg.spike_sigma_multiplier)
            .map_err(|e| BranchError::new(Branch::Alerts, e.to_string()))?;
        alerts.extend(detect_inactivity(
            snapshot.posts(),
            now,
            self.cfg.inactivity_threshold_days,
        ));
        Ok(alerts)
    }

    pub fn trends(&self, snapshot: &Snapshot) -> Result<Trends, BranchError> {
        Ok(daily_counts(snapshot.analytics_posts()))
    }

    pub fn themes(&self, snapshot: &Snapshot) -> Result<ThemeDistribution, BranchError> {
        Ok(theme_distribution(snapshot.analytics_posts()))
    }

    /// Run the four branches one after another on the calling thread.
    pub fn evaluate(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> RunReport {
        let started = Instant::now();
        let ranking = isolate(Branch::Ranking, || self.rank(snapshot));
        let alerts = isolate(Branch::Alerts, || self.alerts(snapshot, now));
        let trends = isolate(Branch::Trends, || self.trends(snapshot));
        let themes = isolate(Branch::Themes, || self.themes(snapshot));
        assemble(snapshot, now, started, ranking, alerts, trends, themes)
    }

    /// Run the four branches as blocking tokio tasks and join them.
    /// Produces exactly what [`Engine::evaluate`] produces.
    pub async fn evaluate_concurrent(&self, snapshot: Arc<Snapshot>, now: DateTime<Utc>) -> RunReport {
        let started = Instant::now();
        let (ranking, alerts, trends, themes) = tokio::join!(
            self.spawn_branch(Branch::Ranking, snapshot.clone(), |e, s| e.rank(s)),
            self.spawn_branch(Branch::Alerts, snapshot.clone(), move |e, s| e.alerts(s, now)),
            self.spawn_branch(Branch::Trends, snapshot.clone(), |e, s| e.trends(s)),
            self.spawn_branch(Branch::Themes, snapshot.clone(), |e, s| e.themes(s)),
        );
        assemble(&snapshot, now, started, ranking, alerts, trends, themes)
    }

    async fn spawn_branch<T, F>(&self, branch: Branch, snapshot: Arc<Snapshot>, f: F) -> Result<T, BranchError>
    where
        T: Send + 'static,
        F: FnOnce(&Engine, &Snapshot) -> Result<T, BranchError> + Send + 'static,
    {
        let engine = self.clone();
        match tokio::task::spawn_blocking(move || f(&engine, &snapshot)).await {
            Ok(res) => res,
            Err(e) => Err(BranchError::new(branch, format!("task failed: {e}"))),
        }
    }
}

/// Ingest and evaluate in one call.
pub fn evaluate(
    records: Vec<serde_json::Value>,
    cfg: EngineConfig,
    now: DateTime<Utc>,
) -> Result<RunReport, ConfigError> {
    let engine = Engine::new(cfg)?;
    let snapshot = engine.ingest(records);
    Ok(engine.evaluate(&snapshot, now))
}

fn isolate<T>(branch: Branch, f: impl FnOnce() -> Result<T, BranchError>) -> Result<T, BranchError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(res) => res,
        Err(payload) => Err(BranchError::new(
            branch,
            format!("panicked: {}", panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn assemble(
    snapshot: &Snapshot,
    now: DateTime<Utc>,
    started: Instant,
    ranking: Result<Vec<SourceScore>, BranchError>,
    alerts: Result<Vec<Alert>, BranchError>,
    trends: Result<Trends, BranchError>,
    themes: Result<ThemeDistribution, BranchError>,
) -> RunReport {
    ensure_metrics_described();

    let ranking_posts = snapshot.ranking_posts().count();
    let degenerate = if snapshot.is_empty() {
        Some(DegenerateInput::NoRecords)
    } else if ranking_posts == 0 {
        Some(DegenerateInput::EmptyWindow)
    } else {
        None
    };

    let mut branch_errors = Vec::new();
    let influence_ranking = keep(ranking, &mut branch_errors);
    let monitoring_alerts = keep(alerts, &mut branch_errors);
    let trends = keep(trends, &mut branch_errors);
    let theme_distribution = keep(themes, &mut branch_errors);

    for e in &branch_errors {
        tracing::error!(target: "engine", branch = e.branch.as_str(), error = %e.message, "branch failed");
        counter!("engine_branch_errors_total", "branch" => e.branch.as_str()).increment(1);
    }
    if let Some(alerts) = &monitoring_alerts {
        for a in alerts {
            counter!("engine_alerts_total", "kind" => a.kind.as_str()).increment(1);
        }
    }
    if let Some(d) = degenerate {
        tracing::info!(target: "engine", reason = %d, "degenerate input, empty ranking");
    }

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    counter!("engine_runs_total").increment(1);
    histogram!("engine_run_ms").record(elapsed_ms);
    gauge!("engine_last_run_ts").set(Utc::now().timestamp() as f64);

    tracing::info!(
        target: "engine",
        sources = influence_ranking.as_ref().map(Vec::len),
        alerts = monitoring_alerts.as_ref().map(Vec::len),
        failed_branches = branch_errors.len(),
        elapsed_ms,
        "evaluation finished"
    );

    RunReport {
        influence_ranking,
        monitoring_alerts,
        trends,
        theme_distribution,
        diagnostics: RunDiagnostics {
            evaluation_time: now,
            ingest: snapshot.stats().clone(),
            ranking_window: snapshot.ranking_window().copied(),
            ranking_posts,
            analytics_window: snapshot.analytics_window().copied(),
            analytics_posts: snapshot.analytics_posts().count(),
            degenerate,
            branch_errors,
        },
    }
}

fn keep<T>(res: Result<T, BranchError>, errors: &mut Vec<BranchError>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}
