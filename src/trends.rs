//! Daily publication counts per source.
//!
//! Days without posts are left out; callers wanting a continuous series fill
//! the gaps themselves.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ingest::types::ClassifiedPost;

/// Parallel, date-ascending `dates` / `counts` for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub dates: Vec<String>,
    pub counts: Vec<usize>,
}

pub type Trends = BTreeMap<String, TrendSeries>;

/// Bucket posts by source and by the calendar day they were published on
/// (in their own offset).
pub fn daily_counts<'a, I>(posts: I) -> Trends
where
    I: IntoIterator<Item = &'a ClassifiedPost>,
{
    let mut buckets: BTreeMap<&str, BTreeMap<NaiveDate, usize>> = BTreeMap::new();
    for p in posts {
        *buckets
            .entry(p.source_id.as_str())
            .or_default()
            .entry(p.published_at.date_naive())
            .or_default() += 1;
    }

    buckets
        .into_iter()
        .map(|(source, days)| {
            let (dates, counts) = days
                .into_iter()
                .map(|(d, n)| (d.format("%Y-%m-%d").to_string(), n))
                .unzip();
            (source.to_string(), TrendSeries { dates, counts })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn post(src: &str, ts: &str) -> ClassifiedPost {
        ClassifiedPost {
            id: format!("{src}@{ts}"),
            source_id: src.into(),
            url: "https://fb.example".into(),
            published_at: DateTime::parse_from_rfc3339(ts).unwrap(),
            like_count: 0,
            share_count: 0,
            comment_count: 0,
            follower_count: 0,
            theme_label: "Sport".into(),
        }
    }

    #[test]
    fn counts_per_day_without_zero_fill() {
        let posts = vec![
            post("A", "2025-02-03T09:00:00Z"),
            post("A", "2025-02-01T09:00:00Z"),
            post("A", "2025-02-03T21:00:00Z"),
            post("B", "2025-02-02T00:00:00Z"),
        ];
        let t = daily_counts(&posts);
        assert_eq!(
            t["A"],
            TrendSeries {
                dates: vec!["2025-02-01".into(), "2025-02-03".into()],
                counts: vec![1, 2],
            }
        );
        assert_eq!(t["B"].counts, vec![1]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn day_follows_publication_offset() {
        // Still 2025-02-02 in UTC; the local date is what counts.
        let posts = vec![post("A", "2025-02-03T00:30:00+02:00")];
        let t = daily_counts(&posts);
        assert_eq!(t["A"].dates, vec!["2025-02-03".to_string()]);
    }

    #[test]
    fn empty_in_empty_out() {
        let none: Vec<ClassifiedPost> = Vec::new();
        assert!(daily_counts(&none).is_empty());
    }
}
