//! # Source Metrics
//! Per-source raw metrics over the ranking window:
//!
//! - audience   = mean follower count
//! - engagement = mean (likes + comments + shares) per post
//! - regularity = posts per week (`post_count / (window_days / 7)`)
//! - diversity  = number of distinct theme labels

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::ingest::types::ClassifiedPost;
use crate::rolling::RunningStats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMetrics {
    pub source_id: String,
    pub post_count: usize,
    pub audience_raw: f64,
    pub engagement_raw: f64,
    pub regularity_raw: f64,
    pub diversity_raw: usize,
}

/// A post whose counters cannot be summed in `u64`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("engagement total of post `{post_id}` overflows")]
pub struct EngagementOverflow {
    pub post_id: String,
}

/// likes + comments + shares for one post.
pub fn engagement_total(post: &ClassifiedPost) -> Result<u64, EngagementOverflow> {
    post.engagement_total().ok_or_else(|| EngagementOverflow {
        post_id: post.id.clone(),
    })
}

/// Group posts by source in ascending source order, keeping input order inside a group.
pub fn group_by_source<'a, I>(posts: I) -> BTreeMap<&'a str, Vec<&'a ClassifiedPost>>
where
    I: IntoIterator<Item = &'a ClassifiedPost>,
{
    let mut groups: BTreeMap<&str, Vec<&ClassifiedPost>> = BTreeMap::new();
    for p in posts {
        groups.entry(p.source_id.as_str()).or_default().push(p);
    }
    groups
}

/// Compute raw metrics for every source present in `posts`, ordered by source id.
pub fn aggregate<'a, I>(posts: I, window_days: u32) -> Result<Vec<SourceMetrics>, EngagementOverflow>
where
    I: IntoIterator<Item = &'a ClassifiedPost>,
{
    let weeks = f64::from(window_days) / 7.0;
    let mut out = Vec::new();

    for (source_id, group) in group_by_source(posts) {
        let mut audience = RunningStats::new();
        let mut engagement = RunningStats::new();
        let mut themes = BTreeSet::new();

        for p in &group {
            audience.push(p.follower_count as f64);
            engagement.push(engagement_total(p)? as f64);
            themes.insert(p.theme_label.as_str());
        }

        out.push(SourceMetrics {
            source_id: source_id.to_string(),
            post_count: group.len(),
            audience_raw: audience.mean(),
            engagement_raw: engagement.mean(),
            regularity_raw: group.len() as f64 / weeks,
            diversity_raw: themes.len(),
        });
    }

    Ok(out)
}
