use anyhow::Result;
use chrono::Utc;
use serde_json::Value;

use odds_window::config::env_bool;
use odds_window::fixtures_fetch::{self, DEFAULT_FIXTURES_URL};
use odds_window::ingest;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let url = parse_url_arg()
        .or_else(|| std::env::var("FIXTURES_URL").ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FIXTURES_URL.to_string());

    eprintln!("Fetching fixtures from {url}...");
    let csv_text = fixtures_fetch::fetch_fixtures_csv(&url)?;
    let rows = fixtures_fetch::parse_fixture_rows(&csv_text)?;
    eprintln!("Downloaded {} fixtures", rows.len());

    let records: Vec<&Value> = rows.iter().collect();
    let mut matches = ingest::normalize_batch(&records);
    // The feed only carries fixtures with at least 1X2 odds unless disabled.
    if env_bool("REQUIRE_H2H", true) {
        matches.retain(|m| m.markets.h2h.is_some());
    }

    let feed = fixtures_fetch::build_feed(matches, Utc::now());
    eprintln!("Processed {} matches with odds", feed.match_count);

    println!("{}", serde_json::to_string_pretty(&feed)?);
    Ok(())
}

fn parse_url_arg() -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(url) = arg.strip_prefix("--url=") {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == "--url"
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
