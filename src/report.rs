//! Output of one engine run: the four artifacts plus diagnostics.
//!
//! A branch that failed leaves its artifact as `None` (`null` in JSON) and
//! shows up in `diagnostics.branch_errors`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alert::Alert;
use crate::analyze::SourceScore;
use crate::error::{BranchError, DegenerateInput};
use crate::ingest::types::{IngestStats, Window};
use crate::themes::ThemeDistribution;
use crate::trends::Trends;

pub const ARTIFACT_RANKING: &str = "influence_ranking";
pub const ARTIFACT_ALERTS: &str = "monitoring_alerts";
pub const ARTIFACT_TRENDS: &str = "trends";
pub const ARTIFACT_THEMES: &str = "theme_distribution";
pub const ARTIFACT_DIAGNOSTICS: &str = "run_diagnostics";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunDiagnostics {
    pub evaluation_time: DateTime<Utc>,
    pub ingest: IngestStats,
    pub ranking_window: Option<Window>,
    pub ranking_posts: usize,
    /// `None` = trends/themes cover the whole snapshot.
    pub analytics_window: Option<Window>,
    pub analytics_posts: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degenerate: Option<DegenerateInput>,
    pub branch_errors: Vec<BranchError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub influence_ranking: Option<Vec<SourceScore>>,
    pub monitoring_alerts: Option<Vec<Alert>>,
    pub trends: Option<Trends>,
    pub theme_distribution: Option<ThemeDistribution>,
    pub diagnostics: RunDiagnostics,
}

impl RunReport {
    /// All four branches succeeded.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.branch_errors.is_empty()
    }

    /// `(name, pretty JSON)` for every artifact that was produced, diagnostics last.
    pub fn artifacts(&self) -> serde_json::Result<Vec<(String, String)>> {
        let mut out = Vec::with_capacity(5);
        if let Some(v) = &self.influence_ranking {
            out.push((ARTIFACT_RANKING.to_string(), serde_json::to_string_pretty(v)?));
        }
        if let Some(v) = &self.monitoring_alerts {
            out.push((ARTIFACT_ALERTS.to_string(), serde_json::to_string_pretty(v)?));
        }
        if let Some(v) = &self.trends {
            out.push((ARTIFACT_TRENDS.to_string(), serde_json::to_string_pretty(v)?));
        }
        if let Some(v) = &self.theme_distribution {
            out.push((ARTIFACT_THEMES.to_string(), serde_json::to_string_pretty(v)?));
        }
        out.push((
            ARTIFACT_DIAGNOSTICS.to_string(),
            serde_json::to_string_pretty(&self.diagnostics)?,
        ));
        Ok(out)
    }
}
