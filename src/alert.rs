//! alert.rs — Monitoring alerts emitted by the anomaly detector.
//!
//! Alerts are regenerated from scratch on every run; they carry no id and are
//! never compared against earlier runs.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::types::ClassifiedPost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// One post far above its source's usual engagement.
    Spike,
    /// Source silent for longer than the configured threshold.
    Inactivity,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Spike => "spike",
            AlertKind::Inactivity => "inactivity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub source_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_link: Option<String>,
    /// Post time for spikes, evaluation time for inactivity.
    pub timestamp: DateTime<FixedOffset>,
}

impl Alert {
    pub fn spike(post: &ClassifiedPost, engagement_total: u64) -> Self {
        Self {
            kind: AlertKind::Spike,
            source_id: post.source_id.clone(),
            message: format!(
                "Engagement spike detected on a post ({engagement_total} interactions)"
            ),
            post_link: Some(post.url.clone()),
            timestamp: post.published_at,
        }
    }

    pub fn inactivity(source_id: impl Into<String>, days_inactive: i64, at: DateTime<Utc>) -> Self {
        Self {
            kind: AlertKind::Inactivity,
            source_id: source_id.into(),
            message: format!("No publication detected for {days_inactive} days"),
            post_link: None,
            timestamp: at.fixed_offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_shape() {
        let at = DateTime::parse_from_rfc3339("2025-08-16T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let a = Alert::inactivity("Radio A", 9, at);
        let v = serde_json::to_value(&a).unwrap();

        assert_eq!(v["kind"], json!("inactivity"));
        assert_eq!(v["source_id"], json!("Radio A"));
        assert_eq!(v["message"], json!("No publication detected for 9 days"));
        assert!(v.get("post_link").is_none());
        let ts = DateTime::parse_from_rfc3339(v["timestamp"].as_str().unwrap()).unwrap();
        assert_eq!(ts, at);
    }

    #[test]
    fn spike_carries_post_link_and_time() {
        let post = ClassifiedPost {
            id: "p9".into(),
            source_id: "TV B".into(),
            url: "https://fb.example/p9".into(),
            published_at: DateTime::parse_from_rfc3339("2025-08-15T18:00:00+01:00").unwrap(),
            like_count: 400,
            share_count: 50,
            comment_count: 50,
            follower_count: 10_000,
            theme_label: "Sport".into(),
        };
        let a = Alert::spike(&post, 500);
        assert_eq!(a.kind, AlertKind::Spike);
        assert_eq!(a.post_link.as_deref(), Some("https://fb.example/p9"));
        assert_eq!(a.timestamp, post.published_at);
        assert!(a.message.contains("500"));
    }
}
