// src/ingest/mod.rs
pub mod providers;
pub mod types;
pub mod window;

use crate::config::EngineConfig;
use crate::error::MalformedRecord;
use crate::ingest::types::{ClassifiedPost, IngestStats, RawPost, Window};
use crate::ingest::window::select_window;
use crate::metrics::ensure_metrics_described;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use metrics::counter;

/// Validated, immutable batch of posts plus the two windows computed over it.
///
/// Owned by the caller; the engine only borrows it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    posts: Vec<ClassifiedPost>,
    ranking_window: Option<Window>,
    analytics_window: Option<Window>,
    stats: IngestStats,
}

impl Snapshot {
    /// Build from already-validated posts. Posts are put in
    /// `(source_id, published_at, id)` order so downstream output does not
    /// depend on the order the collaborator delivered them in.
    pub fn from_posts(mut posts: Vec<ClassifiedPost>, cfg: &EngineConfig) -> Self {
        posts.sort_by(|a, b| {
            a.source_id
                .cmp(&b.source_id)
                .then(a.published_at.cmp(&b.published_at))
                .then(a.id.cmp(&b.id))
        });
        let ranking_window = select_window(&posts, cfg.window_days);
        let analytics_window = cfg
            .analytics_window_days
            .and_then(|days| select_window(&posts, days));
        let stats = IngestStats {
            received: posts.len(),
            accepted: posts.len(),
            ..IngestStats::default()
        };
        Self {
            posts,
            ranking_window,
            analytics_window,
            stats,
        }
    }

    /// Every valid post, regardless of window.
    pub fn posts(&self) -> &[ClassifiedPost] {
        &self.posts
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Posts inside the ranking window (ranking and spike baselines).
    pub fn ranking_posts(&self) -> impl Iterator<Item = &ClassifiedPost> + '_ {
        let w = self.ranking_window;
        self.posts
            .iter()
            .filter(move |p| w.is_some_and(|w| w.contains(p)))
    }

    /// Posts used for trends and themes: everything unless an analytics window is set.
    pub fn analytics_posts(&self) -> impl Iterator<Item = &ClassifiedPost> + '_ {
        let w = self.analytics_window;
        self.posts
            .iter()
            .filter(move |p| w.map_or(true, |w| w.contains(p)))
    }

    pub fn ranking_window(&self) -> Option<&Window> {
        self.ranking_window.as_ref()
    }

    pub fn analytics_window(&self) -> Option<&Window> {
        self.analytics_window.as_ref()
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }
}

/// Parse a publication timestamp. Accepted shapes:
/// RFC 3339 (`T` or space separator), naive `YYYY-MM-DD[T ]HH:MM:SS[.f]`
/// (taken as UTC) and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_published_at(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn required_text(v: Option<String>, field: &'static str) -> Result<String, MalformedRecord> {
    match v {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(MalformedRecord::MissingField(field)),
    }
}

fn required_counter(v: Option<i64>, field: &'static str) -> Result<u64, MalformedRecord> {
    let value = v.ok_or(MalformedRecord::MissingField(field))?;
    u64::try_from(value).map_err(|_| MalformedRecord::NegativeCounter { field, value })
}

fn required_id(v: Option<serde_json::Value>) -> Result<String, MalformedRecord> {
    match v {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_json::Value::String(_)) | Some(serde_json::Value::Null) | None => {
            Err(MalformedRecord::MissingField("id"))
        }
        Some(other) => Err(MalformedRecord::Shape(format!("id must be a string or number, got {other}"))),
    }
}

/// Turn one raw record into a typed post, or explain why not.
pub fn validate_record(raw: RawPost, cfg: &EngineConfig) -> Result<ClassifiedPost, MalformedRecord> {
    let id = required_id(raw.id)?;
    let source_id = required_text(raw.source_id, "source_id")?;
    let url = required_text(raw.url, "url")?;
    let published_raw = required_text(raw.published_at, "published_at")?;
    let published_at = parse_published_at(&published_raw)
        .ok_or(MalformedRecord::BadTimestamp(published_raw))?;
    let like_count = required_counter(raw.like_count, "like_count")?;
    let share_count = required_counter(raw.share_count, "share_count")?;
    let comment_count = required_counter(raw.comment_count, "comment_count")?;
    let follower_count = required_counter(raw.follower_count, "follower_count")?;
    let theme_label = required_text(raw.theme_label, "theme_label")?;
    if !cfg.is_known_theme(&theme_label) {
        return Err(MalformedRecord::UnknownTheme(theme_label));
    }

    Ok(ClassifiedPost {
        id,
        source_id,
        url,
        published_at,
        like_count,
        share_count,
        comment_count,
        follower_count,
        theme_label,
    })
}

/// Validate a batch of loosely-shaped records and build the snapshot.
/// Rejected records are counted per reason; they never abort the batch.
pub fn ingest_records(records: Vec<serde_json::Value>, cfg: &EngineConfig) -> Snapshot {
    ensure_metrics_described();

    let received = records.len();
    let mut posts = Vec::with_capacity(received);
    let mut stats = IngestStats {
        received,
        ..IngestStats::default()
    };

    for (index, value) in records.into_iter().enumerate() {
        let validated = RawPost::from_value(value).and_then(|raw| validate_record(raw, cfg));
        match validated {
            Ok(post) => posts.push(post),
            Err(err) => {
                tracing::debug!(target: "ingest", index, error = %err, "dropping malformed record");
                counter!("ingest_dropped_total", "reason" => err.reason_key()).increment(1);
                stats.dropped += 1;
                *stats
                    .drop_reasons
                    .entry(err.reason_key().to_string())
                    .or_default() += 1;
            }
        }
    }
    stats.accepted = posts.len();
    counter!("ingest_records_total").increment(received as u64);

    if stats.dropped > 0 {
        tracing::warn!(
            target: "ingest",
            received = stats.received,
            dropped = stats.dropped,
            reasons = ?stats.drop_reasons,
            "malformed records skipped"
        );
    }

    let mut snapshot = Snapshot::from_posts(posts, cfg);
    snapshot.stats = stats;
    tracing::info!(
        target: "ingest",
        accepted = snapshot.stats.accepted,
        ranking_posts = snapshot.ranking_posts().count(),
        "snapshot built"
    );
    snapshot
}
