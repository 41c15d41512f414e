use anyhow::Result;
use chrono::Utc;

use odds_window::config::PipelineConfig;
use odds_window::ingest;
use odds_window::merge::{self, MergeOptions, WINDOW_DAYS};
use odds_window::model::Window;
use odds_window::persist;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cfg = PipelineConfig::from_env();

    let existing = persist::load_window(&cfg.existing_path);
    match &existing {
        Some(window) => println!(
            "[INFO] Loaded existing odds: {} matches",
            window.meta.total_matches
        ),
        None => println!("[INFO] No existing odds data found - starting fresh"),
    }

    let load = ingest::load_day_files(&cfg.data_dir);
    for err in &load.errors {
        eprintln!("[WARN] Day file error: {err}");
    }
    if !load.files.is_empty() {
        let summary = load
            .files
            .iter()
            .map(|(name, count)| format!("{name} ({count} matches)"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("[INFO] Loaded new data: {summary}");
    }

    let mut new_matches = load.matches;
    if cfg.require_h2h {
        let before = new_matches.len();
        new_matches.retain(|m| m.markets.h2h.is_some());
        let dropped = before - new_matches.len();
        if dropped > 0 {
            println!("[INFO] Dropped {dropped} matches without 1X2 odds");
        }
    }

    let opts = MergeOptions {
        source: cfg.source.clone(),
        refreshed_days: cfg.refreshed_days.clone(),
    };
    let window = merge::merge(new_matches, existing.as_ref(), Utc::now(), &opts);
    persist::save_window(&cfg.output_path, &window)?;

    print_summary(&window);
    println!("Wrote {}", cfg.output_path.display());
    Ok(())
}

fn print_summary(window: &Window) {
    println!("{}", "=".repeat(50));
    println!("           MERGE SUMMARY");
    println!("{}", "=".repeat(50));
    println!("Total matches: {}", window.meta.total_matches);
    println!(
        "Coverage: {}/{} days",
        window.meta.days_with_data, WINDOW_DAYS
    );
    if let Some(err) = &window.meta.error {
        println!("[WARN] {err}");
    }
    println!();
    for day in 0..WINDOW_DAYS {
        let key = day.to_string();
        let count = window
            .by_day
            .get(&key)
            .map(|bucket| bucket.match_count)
            .unwrap_or(0);
        let refreshed = if window.meta.last_refreshed_days.contains(&(day as u8)) {
            "*"
        } else {
            " "
        };
        let status = if count > 0 { "+" } else { "-" };
        println!("  {refreshed} {status} Day {day}: {count:3} matches");
    }
    println!("{}", "=".repeat(50));
}
