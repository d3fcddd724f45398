//! Batch runner: read one classified-post export, evaluate it, write the
//! artifacts as JSON files.
//!
//! Environment:
//!   MEDIA_SCAN_INPUT           snapshot file (default `data/classified_posts.json`)
//!   MEDIA_SCAN_OUTPUT_DIR      artifact directory (default `output`)
//!   MEDIA_SCAN_EVALUATION_TIME RFC 3339 instant (default: now)
//!   MEDIA_SCAN_CONFIG_PATH     engine config, see `config::engine`

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use media_scan_engine::config::load_engine_config_default;
use media_scan_engine::ingest::providers::JsonFileSource;
use media_scan_engine::ingest::types::SnapshotSource;
use media_scan_engine::logging::init_tracing;
use media_scan_engine::sink::{publish, JsonDirSink};
use media_scan_engine::Engine;

const ENV_INPUT: &str = "MEDIA_SCAN_INPUT";
const ENV_OUTPUT_DIR: &str = "MEDIA_SCAN_OUTPUT_DIR";
const ENV_EVALUATION_TIME: &str = "MEDIA_SCAN_EVALUATION_TIME";
const DEFAULT_INPUT: &str = "data/classified_posts.json";
const DEFAULT_OUTPUT_DIR: &str = "output";

fn evaluation_time() -> Result<DateTime<Utc>> {
    match std::env::var(ENV_EVALUATION_TIME) {
        Ok(s) => Ok(DateTime::parse_from_rfc3339(s.trim())
            .with_context(|| format!("{ENV_EVALUATION_TIME}={s} is not RFC 3339"))?
            .with_timezone(&Utc)),
        Err(_) => Ok(Utc::now()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = load_engine_config_default().context("loading engine config")?;
    let engine = Engine::new(cfg).context("invalid engine config")?;

    let input = std::env::var(ENV_INPUT).unwrap_or_else(|_| DEFAULT_INPUT.to_string());
    let output = std::env::var(ENV_OUTPUT_DIR).unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string());
    let now = evaluation_time()?;

    let source = JsonFileSource::new(&input);
    let records = source.fetch().await?;
    tracing::info!(source = source.name(), input = %input, records = records.len(), "snapshot loaded");

    let snapshot = Arc::new(engine.ingest(records));
    let report = engine.evaluate_concurrent(snapshot, now).await;

    let sink = JsonDirSink::new(&output);
    publish(&report, &sink).await?;

    if !report.is_complete() {
        for e in &report.diagnostics.branch_errors {
            tracing::warn!(error = %e, "partial report");
        }
    }
    Ok(())
}
