// src/analyze/mod.rs
//! Influence ranking: raw source metrics → normalized components → weighted total.

pub mod scoring;
pub mod weights;

pub use crate::analyze::scoring::{score_sources, SourceScore};
pub use crate::analyze::weights::Weights;

use crate::ingest::types::ClassifiedPost;
use crate::source_metrics::{aggregate, EngagementOverflow};

/// Aggregate the window's posts per source and rank them.
pub fn rank_sources<'a, I>(
    posts: I,
    window_days: u32,
    weights: &Weights,
    theme_catalog_size: usize,
) -> Result<Vec<SourceScore>, EngagementOverflow>
where
    I: IntoIterator<Item = &'a ClassifiedPost>,
{
    let metrics = aggregate(posts, window_days)?;
    Ok(score_sources(&metrics, weights, theme_catalog_size))
}
