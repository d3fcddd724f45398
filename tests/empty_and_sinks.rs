//! Degenerate input and artifact publication.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use media_scan_engine::error::DegenerateInput;
use media_scan_engine::sink::{publish, JsonDirSink, MemorySink};
use media_scan_engine::{evaluate, EngineConfig};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-02-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn empty_input_gives_four_empty_artifacts() {
    let report = evaluate(Vec::new(), EngineConfig::default(), now()).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.diagnostics.degenerate, Some(DegenerateInput::NoRecords));

    let artifacts = report.artifacts().unwrap();
    let parsed: Vec<(String, Value)> = artifacts
        .into_iter()
        .map(|(n, s)| (n, serde_json::from_str(&s).unwrap()))
        .collect();
    let names: Vec<_> = parsed.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "influence_ranking",
            "monitoring_alerts",
            "trends",
            "theme_distribution",
            "run_diagnostics"
        ]
    );
    assert_eq!(parsed[0].1, json!([]));
    assert_eq!(parsed[1].1, json!([]));
    assert_eq!(parsed[2].1, json!({}));
    assert_eq!(parsed[3].1, json!({ "global": [], "by_source": {} }));
}

#[test]
fn only_malformed_records_is_still_degenerate() {
    let records = vec![json!({ "id": "x" }), json!(17)];
    let report = evaluate(records, EngineConfig::default(), now()).unwrap();
    assert_eq!(report.diagnostics.ingest.received, 2);
    assert_eq!(report.diagnostics.ingest.dropped, 2);
    assert_eq!(report.diagnostics.degenerate, Some(DegenerateInput::NoRecords));
    assert_eq!(report.influence_ranking, Some(Vec::new()));
}

#[tokio::test]
async fn memory_sink_receives_one_batch() {
    let report = evaluate(Vec::new(), EngineConfig::default(), now()).unwrap();
    let sink = MemorySink::new();
    let n = publish(&report, &sink).await.unwrap();
    assert_eq!(n, 5);
    let calls = sink.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 5);
}

#[tokio::test]
async fn json_dir_sink_writes_named_files() {
    let records = vec![json!({
        "id": "p1", "source_id": "Radio A", "url": "https://fb.example/p1",
        "published_at": "2025-01-30T08:00:00Z", "like_count": 3, "share_count": 0,
        "comment_count": 1, "follower_count": 50, "theme_label": "Culture"
    })];
    let report = evaluate(records, EngineConfig::default(), now()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("output");
    publish(&report, &JsonDirSink::new(&out)).await.unwrap();

    for name in [
        "influence_ranking",
        "monitoring_alerts",
        "trends",
        "theme_distribution",
        "run_diagnostics",
    ] {
        assert!(out.join(format!("{name}.json")).is_file(), "{name} missing");
    }
    let ranking: Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("influence_ranking.json")).unwrap()).unwrap();
    assert_eq!(ranking[0]["source_id"], "Radio A");
    assert_eq!(ranking[0]["rank"], 1);
}
