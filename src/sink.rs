// src/sink.rs
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::report::RunReport;

#[async_trait::async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store `(name, content)` pairs. Names carry no extension.
    async fn store(&self, items: Vec<(String, String)>) -> Result<()>;
}

/// Writes every artifact to `<dir>/<name>.json`, creating `dir` if needed.
pub struct JsonDirSink {
    dir: PathBuf,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[async_trait::async_trait]
impl ArtifactSink for JsonDirSink {
    async fn store(&self, items: Vec<(String, String)>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;
        for (name, content) in items {
            let path = self.dir.join(format!("{name}.json"));
            tokio::fs::write(&path, content)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::debug!(target: "engine", path = %path.display(), "artifact written");
        }
        Ok(())
    }
}

/// Keeps every batch in memory.
#[derive(Default)]
pub struct MemorySink {
    pub calls: std::sync::Mutex<Vec<Vec<(String, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ArtifactSink for MemorySink {
    async fn store(&self, items: Vec<(String, String)>) -> Result<()> {
        self.calls
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink poisoned"))?
            .push(items);
        Ok(())
    }
}

/// Render the report's artifacts and hand them to `sink` in one batch.
pub async fn publish<S: ArtifactSink + ?Sized>(report: &RunReport, sink: &S) -> Result<usize> {
    let items = report.artifacts().context("rendering artifacts")?;
    let n = items.len();
    sink.store(items).await?;
    tracing::info!(target: "engine", artifacts = n, complete = report.is_complete(), "artifacts published");
    Ok(n)
}
