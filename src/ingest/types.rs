// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::MalformedRecord;

/// Record as handed over by the classifier, before validation.
///
/// Every field may arrive under several column names (see [`COLUMNS`]).
/// Counters stay `i64` so negative values can be reported as such.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPost {
    pub id: Option<Value>,
    pub source_id: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub like_count: Option<i64>,
    pub share_count: Option<i64>,
    pub comment_count: Option<i64>,
    pub follower_count: Option<i64>,
    pub theme_label: Option<String>,
}

/// Canonical field name, then the export column names accepted for it.
pub const COLUMNS: [(&str, &[&str]); 9] = [
    ("id", &["id"]),
    ("source_id", &["source_id", "sourceId", "media"]),
    ("url", &["url"]),
    ("published_at", &["published_at", "publishedAt", "post_date"]),
    ("like_count", &["like_count", "likeCount"]),
    ("share_count", &["share_count", "shareCount"]),
    ("comment_count", &["comment_count", "commentCount", "comments_count"]),
    (
        "follower_count",
        &["follower_count", "followerCount", "followerCountAtSource", "followers_count"],
    ),
    ("theme_label", &["theme_label", "themeLabel", "theme"]),
];

impl RawPost {
    /// Read a loosely-shaped JSON record. Unknown columns are ignored; a field
    /// given under several names must carry the same value under each.
    pub fn from_value(value: Value) -> Result<Self, MalformedRecord> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(MalformedRecord::Shape(format!(
                    "expected an object, got {other}"
                )))
            }
        };
        let mut raw = RawPost::default();
        for (field, names) in COLUMNS {
            let Some(v) = pick(&map, field, names)? else {
                continue;
            };
            match field {
                "id" => raw.id = Some(v.clone()),
                "source_id" => raw.source_id = Some(text(field, v)?),
                "url" => raw.url = Some(text(field, v)?),
                "published_at" => raw.published_at = Some(text(field, v)?),
                "like_count" => raw.like_count = Some(counter(field, v)?),
                "share_count" => raw.share_count = Some(counter(field, v)?),
                "comment_count" => raw.comment_count = Some(counter(field, v)?),
                "follower_count" => raw.follower_count = Some(counter(field, v)?),
                _ => raw.theme_label = Some(text(field, v)?),
            }
        }
        Ok(raw)
    }
}

/// First non-null value among `names`; other non-null spellings must agree with it.
fn pick<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
    names: &[&str],
) -> Result<Option<&'a Value>, MalformedRecord> {
    let mut found: Option<&Value> = None;
    for v in names.iter().filter_map(|n| map.get(*n)) {
        if v.is_null() {
            continue;
        }
        match found {
            None => found = Some(v),
            Some(prev) if prev == v => {}
            Some(_) => return Err(MalformedRecord::ConflictingField(field)),
        }
    }
    Ok(found)
}

fn text(field: &'static str, v: &Value) -> Result<String, MalformedRecord> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| MalformedRecord::Shape(format!("`{field}` must be a string, got {v}")))
}

fn counter(field: &'static str, v: &Value) -> Result<i64, MalformedRecord> {
    let Value::Number(n) = v else {
        return Err(MalformedRecord::Shape(format!(
            "`{field}` must be a number, got {v}"
        )));
    };
    if let Some(i) = n.as_i64() {
        Ok(i)
    } else if n.is_u64() {
        Err(MalformedRecord::Shape(format!("`{field}` out of range: {n}")))
    } else {
        Err(MalformedRecord::NonIntegerCounter {
            field,
            value: n.to_string(),
        })
    }
}

/// Validated post. Immutable once built by the ingestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedPost {
    pub id: String,
    pub source_id: String,
    pub url: String,
    /// Kept in the offset it was published with; day bucketing uses that local date.
    pub published_at: DateTime<FixedOffset>,
    pub like_count: u64,
    pub share_count: u64,
    pub comment_count: u64,
    pub follower_count: u64,
    pub theme_label: String,
}

impl ClassifiedPost {
    /// likes + comments + shares; `None` on u64 overflow.
    pub fn engagement_total(&self) -> Option<u64> {
        self.like_count
            .checked_add(self.comment_count)?
            .checked_add(self.share_count)
    }
}

/// Trailing span anchored at the newest post of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub days: u32,
    pub latest: DateTime<FixedOffset>,
    pub cutoff: DateTime<FixedOffset>,
}

impl Window {
    pub fn contains(&self, post: &ClassifiedPost) -> bool {
        post.published_at >= self.cutoff
    }
}

/// Per-run ingestion bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub received: usize,
    pub accepted: usize,
    pub dropped: usize,
    /// reason key → count
    pub drop_reasons: BTreeMap<String, usize>,
}

/// Collaborator that hands the engine one batch of raw records.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Value>>;
    fn name(&self) -> &'static str;
}
