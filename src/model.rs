use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical match record shared by every pipeline stage.
///
/// `commence_time` is `YYYY-MM-DDTHH:MM:SSZ` when the source date parsed,
/// empty otherwise (the match is kept but cannot be day-bucketed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub commence_time: String,
    #[serde(default = "unknown_league")]
    pub league: String,
    #[serde(default)]
    pub markets: Markets,
}

pub fn unknown_league() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Markets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h2h: Option<H2h>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btts: Option<Btts>,
}

impl Markets {
    pub fn is_empty(&self) -> bool {
        self.h2h.is_none() && self.totals.is_none() && self.btts.is_none()
    }
}

/// 1X2 decimal odds. Draw may be absent for markets without one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct H2h {
    pub home: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw: Option<f64>,
    pub away: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub over: f64,
    pub under: f64,
    #[serde(default = "default_line")]
    pub line: f64,
}

pub fn default_line() -> f64 {
    2.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Btts {
    pub yes: f64,
    pub no: f64,
}

/// Persisted 7-day rolling window, keyed by day offset ("0" = today).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub meta: WindowMeta,
    #[serde(default)]
    pub by_day: BTreeMap<String, DayBucket>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: String,
    pub day_name: String,
    pub match_count: usize,
    #[serde(default)]
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMeta {
    pub updated_at: String,
    pub source: String,
    pub total_matches: usize,
    pub coverage_days: u8,
    pub days_with_data: usize,
    #[serde(default)]
    pub last_refreshed_days: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
