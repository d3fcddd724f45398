//! Ranking window versus analytics span over a 30-day export.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};

use media_scan_engine::{Engine, EngineConfig};

fn thirty_days() -> Vec<Value> {
    let start = DateTime::parse_from_rfc3339("2025-01-01T12:00:00Z").unwrap();
    (0..30)
        .map(|d| {
            let at = start + Duration::days(d);
            let theme = if d < 6 { "Sport" } else { "Politique" };
            json!({
                "id": format!("p{d:02}"),
                "source_id": "Radio A",
                "url": format!("https://fb.example/p{d:02}"),
                "published_at": at.to_rfc3339(),
                "like_count": 4, "share_count": 1, "comment_count": 2,
                "follower_count": 800,
                "theme_label": theme,
            })
        })
        .collect()
}

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-31T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn ranking_uses_window_while_trends_and_themes_see_everything() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let snapshot = engine.ingest(thirty_days());
    let report = engine.evaluate(&snapshot, now());

    // Latest post 2025-01-30T12:00, cutoff 2025-01-07T12:00 inclusive.
    let window = report.diagnostics.ranking_window.unwrap();
    assert_eq!(window.days, 23);
    assert_eq!(window.cutoff, DateTime::parse_from_rfc3339("2025-01-07T12:00:00Z").unwrap());
    assert_eq!(report.diagnostics.ranking_posts, 24);
    assert_eq!(report.diagnostics.analytics_posts, 30);
    assert!(report.diagnostics.analytics_window.is_none());

    let ranking = report.influence_ranking.unwrap();
    assert_eq!(ranking.len(), 1);
    let a = &ranking[0];
    assert!((a.regularity_raw - 24.0 / (23.0 / 7.0)).abs() < 1e-9);
    // Sport only appears before the cutoff.
    assert_eq!(a.diversity_raw, 1);

    let trends = report.trends.unwrap();
    assert_eq!(trends["Radio A"].dates.len(), 30);
    assert_eq!(trends["Radio A"].dates[0], "2025-01-01");

    let themes = report.theme_distribution.unwrap();
    assert_eq!(themes.by_source["Radio A"]["Sport"], 6);
    assert_eq!(themes.by_source["Radio A"]["Politique"], 24);
}

#[test]
fn analytics_window_narrows_trends_and_themes_only() {
    let cfg = EngineConfig {
        analytics_window_days: Some(9),
        ..EngineConfig::default()
    };
    let engine = Engine::new(cfg).unwrap();
    let report = engine.evaluate(&engine.ingest(thirty_days()), now());

    assert_eq!(report.diagnostics.ranking_posts, 24);
    assert_eq!(report.diagnostics.analytics_posts, 10);
    let trends = report.trends.unwrap();
    assert_eq!(trends["Radio A"].dates.first().map(String::as_str), Some("2025-01-21"));
    assert!(report.theme_distribution.unwrap().by_source["Radio A"].get("Sport").is_none());
}

#[test]
fn evaluation_time_does_not_move_the_window() {
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let snapshot = engine.ingest(thirty_days());
    let early = engine.evaluate(&snapshot, now());
    let late = engine.evaluate(&snapshot, now() + Duration::days(365));
    assert_eq!(early.influence_ranking, late.influence_ranking);
    assert_eq!(early.diagnostics.ranking_window, late.diagnostics.ranking_window);
}
