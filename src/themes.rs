//! Theme distribution, globally and per source. Sparse: absent combinations
//! are simply not in the maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ingest::types::ClassifiedPost;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDistribution {
    /// Most frequent first; equal counts by theme name.
    pub global: Vec<ThemeCount>,
    pub by_source: BTreeMap<String, BTreeMap<String, usize>>,
}

pub fn theme_distribution<'a, I>(posts: I) -> ThemeDistribution
where
    I: IntoIterator<Item = &'a ClassifiedPost>,
{
    let mut global: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_source: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

    for p in posts {
        *global.entry(p.theme_label.as_str()).or_default() += 1;
        *by_source
            .entry(p.source_id.clone())
            .or_default()
            .entry(p.theme_label.clone())
            .or_default() += 1;
    }

    let mut global: Vec<ThemeCount> = global
        .into_iter()
        .map(|(theme, count)| ThemeCount {
            theme: theme.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the name order from the BTreeMap for equal counts.
    global.sort_by(|a, b| b.count.cmp(&a.count));

    ThemeDistribution { global, by_source }
}
