use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

use crate::fixtures_fetch::DEFAULT_FIXTURES_URL;
use crate::merge::WINDOW_DAYS;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub existing_path: PathBuf,
    pub output_path: PathBuf,
    pub fixtures_url: String,
    pub source: String,
    /// Drop matches without a 1X2 market before merging. The fetch feed
    /// filters these; the merge pipeline keeps them by default.
    pub require_h2h: bool,
    /// Explicit "days this run scraped" override (comma-separated offsets).
    /// Unset means the merger derives the set from the batch itself.
    pub refreshed_days: Option<BTreeSet<u8>>,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(env_trimmed("ODDS_DATA_DIR").unwrap_or_else(|| "data".into()));
        let existing_path = env_trimmed("ODDS_EXISTING_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("existing_odds.json"));
        let output_path = env_trimmed("ODDS_OUTPUT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("odds.json"));
        let fixtures_url =
            env_trimmed("FIXTURES_URL").unwrap_or_else(|| DEFAULT_FIXTURES_URL.to_string());
        let source = env_trimmed("ODDS_SOURCE").unwrap_or_else(|| "oddsharvester".to_string());
        let require_h2h = env_bool("REQUIRE_H2H", false);
        let refreshed_days = env_trimmed("REFRESHED_DAYS").map(|raw| parse_day_set(&raw));

        Self {
            data_dir,
            existing_path,
            output_path,
            fixtures_url,
            source,
            require_h2h,
            refreshed_days,
        }
    }
}

fn parse_day_set(raw: &str) -> BTreeSet<u8> {
    raw.split([',', ';', ' '])
        .filter_map(|part| part.trim().parse::<u8>().ok())
        .filter(|day| i64::from(*day) < WINDOW_DAYS)
        .collect()
}

fn env_trimmed(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}
