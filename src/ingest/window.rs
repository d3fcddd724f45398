// src/ingest/window.rs
//! Window selection: cutoff = newest `published_at` in the dataset − `days`.
//! Posts at or after the cutoff are inside.

use chrono::{DateTime, Duration, Utc};

use crate::ingest::types::{ClassifiedPost, Window};

/// Anchor a `days`-long window at the newest post; `None` for an empty slice.
pub fn select_window(posts: &[ClassifiedPost], days: u32) -> Option<Window> {
    let latest = posts.iter().map(|p| p.published_at).max()?;
    let cutoff = latest
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC.fixed_offset());
    Some(Window {
        days,
        latest,
        cutoff,
    })
}
