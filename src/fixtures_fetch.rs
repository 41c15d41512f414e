use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::USER_AGENT;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::http_client::http_client;
use crate::model::Match;

pub const DEFAULT_FIXTURES_URL: &str = "https://www.football-data.co.uk/fixtures.csv";

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Normalized feed document printed by the fetch bin; the shape the display
/// client's harvester expects.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureFeed {
    pub matches: Vec<Match>,
    pub last_updated: String,
    pub source: String,
    pub match_count: usize,
}

pub fn build_feed(matches: Vec<Match>, now: DateTime<Utc>) -> FixtureFeed {
    let match_count = matches.len();
    FixtureFeed {
        matches,
        last_updated: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        source: "football-data.co.uk".to_string(),
        match_count,
    }
}

/// Download the upcoming-fixtures CSV. The site rejects non-browser agents.
pub fn fetch_fixtures_csv(url: &str) -> Result<String> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .header(USER_AGENT, BROWSER_UA)
        .send()
        .context("fixtures request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading fixtures body")?;
    if !status.is_success() {
        let snippet = body
            .trim()
            .replace('\n', " ")
            .replace('\r', " ")
            .chars()
            .take(220)
            .collect::<String>();
        return Err(anyhow::anyhow!("fixtures http {}: {}", status, snippet));
    }
    Ok(body)
}

/// CSV rows become raw records for the normalizer: header cell -> value,
/// with empty cells omitted so field probes see them as absent. Rows that
/// fail to decode are skipped.
pub fn parse_fixture_rows(csv_text: &str) -> Result<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader
        .headers()
        .context("fixtures csv has no header row")?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let Ok(record) = result else {
            continue;
        };
        let mut row = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let header = header.trim();
            let cell = cell.trim();
            if header.is_empty() || cell.is_empty() {
                continue;
            }
            row.insert(header.to_string(), Value::String(cell.to_string()));
        }
        if !row.is_empty() {
            rows.push(Value::Object(row));
        }
    }
    Ok(rows)
}
