use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde_json::Value;

use crate::merge::WINDOW_DAYS;
use crate::model::Match;
use crate::normalize::normalize;

/// Pull the record list out of a scraped payload. Feeds disagree on the top
/// level: a plain list, an object wrapping `matches` or `data`, or a single
/// record.
pub fn collect_records(payload: &Value) -> Vec<&Value> {
    match payload {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => {
            for key in ["matches", "data"] {
                if let Some(items) = obj.get(key).and_then(Value::as_array) {
                    return items.iter().collect();
                }
            }
            vec![payload]
        }
        _ => Vec::new(),
    }
}

/// Records carry no ordering dependency between each other, so the batch
/// normalizes in parallel; output order follows input order.
pub fn normalize_batch(records: &[&Value]) -> Vec<Match> {
    records
        .par_iter()
        .filter_map(|record| normalize(record))
        .collect()
}

#[derive(Debug, Default)]
pub struct DayLoad {
    pub matches: Vec<Match>,
    /// (file name, matches parsed) per day file found.
    pub files: Vec<(String, usize)>,
    pub errors: Vec<String>,
}

/// Load freshly scraped `day0.json` .. `day6.json` from the data directory.
/// Missing files are normal (a run usually scrapes one day); unreadable ones
/// are reported and skipped.
pub fn load_day_files(dir: &Path) -> DayLoad {
    let mut load = DayLoad::default();

    for day in 0..WINDOW_DAYS {
        let name = format!("day{day}.json");
        let path = dir.join(&name);
        let Ok(raw) = fs::read_to_string(&path) else {
            continue;
        };
        let payload: Value = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(err) => {
                load.errors.push(format!("{name}: {err}"));
                continue;
            }
        };
        let records = collect_records(&payload);
        let parsed = normalize_batch(&records);
        if !parsed.is_empty() {
            load.files.push((name, parsed.len()));
            load.matches.extend(parsed);
        }
    }

    load
}
