use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::Value;

use odds_window::ingest::{collect_records, normalize_batch};
use odds_window::merge::{MergeOptions, merge};
use odds_window::model::Window;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn now() -> DateTime<Utc> {
    "2025-01-15T12:00:00Z"
        .parse::<DateTime<Utc>>()
        .expect("valid test timestamp")
}

fn existing_window() -> Window {
    serde_json::from_str(&read_fixture("existing_window.json"))
        .expect("window fixture should deserialize")
}

fn day3_batch() -> Vec<odds_window::model::Match> {
    let raw = read_fixture("day3_sample.json");
    let payload: Value = serde_json::from_str(&raw).expect("valid json");
    let records = collect_records(&payload);
    normalize_batch(&records)
}

#[test]
fn single_day_refresh_preserves_other_days() {
    let previous = existing_window();
    let merged = merge(
        day3_batch(),
        Some(&previous),
        now(),
        &MergeOptions::default(),
    );

    // Day 3 is exactly the new batch; the stale entry is gone.
    let day3 = &merged.by_day["3"];
    assert_eq!(day3.match_count, 2);
    assert!(day3.matches.iter().all(|m| m.home_team != "Stale United"));

    // Untouched days carry over as-is.
    assert_eq!(merged.by_day["0"].matches, previous.by_day["0"].matches);
    assert_eq!(merged.by_day["5"].matches, previous.by_day["5"].matches);

    assert_eq!(merged.meta.total_matches, 5);
    assert_eq!(merged.meta.days_with_data, 3);
    assert_eq!(merged.meta.last_refreshed_days, vec![3]);
    assert!(merged.meta.error.is_none());
}

#[test]
fn window_wire_shape_is_complete() {
    let merged = merge(
        day3_batch(),
        Some(&existing_window()),
        now(),
        &MergeOptions::default(),
    );
    let doc = serde_json::to_value(&merged).expect("window should serialize");

    let meta = &doc["meta"];
    assert_eq!(meta["updated_at"], "2025-01-15T12:00:00Z");
    assert_eq!(meta["source"], "oddsharvester");
    assert_eq!(meta["coverage_days"], 7);
    assert!(meta.get("error").is_none());

    let by_day = doc["by_day"].as_object().expect("by_day object");
    assert_eq!(by_day.len(), 7);
    for offset in 0..7 {
        let bucket = &by_day[&offset.to_string()];
        assert!(bucket["date"].is_string());
        assert!(bucket["day_name"].is_string());
        assert!(bucket["matches"].is_array());
    }
    assert_eq!(by_day["0"]["date"], "2025-01-15");
    assert_eq!(by_day["3"]["date"], "2025-01-18");

    // Flat list is chronological across buckets.
    let times: Vec<&str> = doc["matches"]
        .as_array()
        .expect("matches array")
        .iter()
        .map(|m| m["commence_time"].as_str().unwrap_or_default())
        .collect();
    let mut sorted = times.clone();
    sorted.sort();
    assert_eq!(times, sorted);
}

#[test]
fn round_trips_through_persisted_json() {
    let merged = merge(
        day3_batch(),
        Some(&existing_window()),
        now(),
        &MergeOptions::default(),
    );
    let json = serde_json::to_string(&merged).expect("serialize");
    let reloaded: Window = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(merged, reloaded);
}

#[test]
fn no_input_still_produces_a_parseable_document() {
    let window = merge(Vec::new(), None, now(), &MergeOptions::default());
    let doc = serde_json::to_value(&window).expect("window should serialize");
    assert_eq!(doc["meta"]["total_matches"], 0);
    assert_eq!(doc["meta"]["error"], "No data available");
    assert_eq!(doc["by_day"].as_object().map(|o| o.len()), Some(7));
    assert_eq!(doc["matches"].as_array().map(|a| a.len()), Some(0));
}
