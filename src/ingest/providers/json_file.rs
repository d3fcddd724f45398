use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use std::path::PathBuf;

use crate::ingest::types::SnapshotSource;

/// Reads the classifier's JSON export: either a bare array of records or an
/// object with a `posts` array.
pub struct JsonFileSource {
    mode: Mode,
}

enum Mode {
    File(PathBuf),
    Inline(String),
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::File(path.into()),
        }
    }

    /// Serve an in-memory document.
    pub fn from_json_str(s: &str) -> Self {
        Self {
            mode: Mode::Inline(s.to_string()),
        }
    }
}

/// Parse a snapshot document (file contents or request body) into raw records.
pub fn parse_snapshot(bytes: &[u8]) -> Result<Vec<serde_json::Value>> {
    let t0 = std::time::Instant::now();
    let doc: serde_json::Value = serde_json::from_slice(bytes).context("parsing snapshot json")?;
    let records = records_from_document(doc)?;
    histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    Ok(records)
}

/// Unwrap a snapshot document into its records.
pub fn records_from_document(doc: serde_json::Value) -> Result<Vec<serde_json::Value>> {
    match doc {
        serde_json::Value::Array(items) => Ok(items),
        serde_json::Value::Object(mut obj) => match obj.remove("posts") {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => bail!("snapshot object has no `posts` array"),
        },
        other => bail!("snapshot must be an array or an object, got {other}"),
    }
}

#[async_trait]
impl SnapshotSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<serde_json::Value>> {
        match &self.mode {
            Mode::File(path) => {
                let body = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                parse_snapshot(&body)
            }
            Mode::Inline(s) => parse_snapshot(s.as_bytes()),
        }
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}
