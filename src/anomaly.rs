//! anomaly.rs — Spike and inactivity detection.
//!
//! Spike: per source over the ranking window, threshold = μ + k·σ with the
//! population σ of per-post engagement. A post alerts when strictly above it,
//! so a source with a single post (σ = 0, threshold = its own value) never
//! alerts.
//!
//! Inactivity: per source over *all* its posts, whole days between the last
//! post and the evaluation time. Alerts when strictly above the threshold.
//! The evaluation time is independent of the ranking window's anchor.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::alert::Alert;
use crate::ingest::types::ClassifiedPost;
use crate::rolling::RunningStats;
use crate::source_metrics::{engagement_total, group_by_source, EngagementOverflow};

/// Engagement baseline of one source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
}

impl Baseline {
    pub fn from_totals(totals: &[u64], sigma_multiplier: f64) -> Self {
        let stats: RunningStats = totals.iter().map(|&t| t as f64).collect();
        let mean = stats.mean();
        let std_dev = stats.population_std_dev();
        Self {
            mean,
            std_dev,
            threshold: mean + sigma_multiplier * std_dev,
        }
    }

    pub fn is_spike(&self, total: u64) -> bool {
        total as f64 > self.threshold
    }
}

/// Spike alerts for the ranking-window posts, ordered by source then post time.
pub fn detect_spikes<'a, I>(posts: I, sigma_multiplier: f64) -> Result<Vec<Alert>, EngagementOverflow>
where
    I: IntoIterator<Item = &'a ClassifiedPost>,
{
    let mut alerts = Vec::new();
    for (_, group) in group_by_source(posts) {
        let totals = group
            .iter()
            .map(|p| engagement_total(p))
            .collect::<Result<Vec<_>, _>>()?;
        let baseline = Baseline::from_totals(&totals, sigma_multiplier);

        for (post, &total) in group.iter().zip(&totals) {
            if baseline.is_spike(total) {
                tracing::debug!(
                    target: "engine",
                    source = %post.source_id,
                    post = %post.id,
                    total,
                    threshold = baseline.threshold,
                    "engagement spike"
                );
                alerts.push(Alert::spike(post, total));
            }
        }
    }
    Ok(alerts)
}

/// Whole days (floored) from `last_post` to `now`; negative when the post is in the future.
pub fn days_inactive(last_post: DateTime<chrono::FixedOffset>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(last_post).num_days()
}

/// Inactivity alerts over the full (unwindowed) post set, ordered by source.
pub fn detect_inactivity<'a, I>(posts: I, now: DateTime<Utc>, threshold_days: u32) -> Vec<Alert>
where
    I: IntoIterator<Item = &'a ClassifiedPost>,
{
    group_by_source(posts)
        .into_iter()
        .filter_map(|(source_id, group)| {
            let last = group.iter().map(|p| p.published_at).max()?;
            let days = days_inactive(last, now);
            (days > i64::from(threshold_days)).then(|| Alert::inactivity(source_id, days, now))
        })
        .collect()
}
