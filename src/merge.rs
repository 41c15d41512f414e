use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};

use crate::model::{DayBucket, Match, Window, WindowMeta};

pub const WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Source identifier written into `meta.source`.
    pub source: String,
    /// Days this run is authoritative for. `None` derives the set from the
    /// offsets actually present in the new batch, which means a day the
    /// scraper found nothing for keeps its previous matches. Supplying the
    /// set explicitly clears declared days even when they arrive empty.
    pub refreshed_days: Option<BTreeSet<u8>>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            source: "oddsharvester".to_string(),
            refreshed_days: None,
        }
    }
}

/// Day-bucket index of a match relative to `today`, or `None` when the
/// commence time is empty or unparseable. Values outside `0..7` are out of
/// the display horizon.
pub fn day_offset(commence_time: &str, today: NaiveDate) -> Option<i64> {
    let date_part = commence_time.split('T').next().unwrap_or_default();
    let date_part = date_part.get(..10).unwrap_or(date_part);
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some((date - today).num_days())
}

pub fn dedup_key(m: &Match) -> String {
    format!("{}|{}|{}", m.home_team, m.away_team, m.commence_time).to_lowercase()
}

/// Merge a freshly normalized batch into the previous 7-day window.
///
/// Days covered by the new batch are replaced wholesale; untouched days carry
/// over from `previous` after their offsets are recomputed against the
/// current date (the window self-corrects as "today" advances between runs).
/// The result is always a complete, freshly built window; `previous` is never
/// mutated.
pub fn merge(
    new_matches: Vec<Match>,
    previous: Option<&Window>,
    now: DateTime<Utc>,
    opts: &MergeOptions,
) -> Window {
    let today = now.date_naive();
    let no_input = new_matches.is_empty() && previous.is_none();

    let mut batch_days: BTreeSet<u8> = BTreeSet::new();
    for m in &new_matches {
        if let Some(day) = day_offset(&m.commence_time, today)
            && (0..WINDOW_DAYS).contains(&day)
        {
            batch_days.insert(day as u8);
        }
    }
    let refreshed = opts.refreshed_days.clone().unwrap_or(batch_days);

    let mut buckets: Vec<Vec<Match>> = (0..WINDOW_DAYS).map(|_| Vec::new()).collect();
    let mut seen: HashSet<String> = HashSet::new();

    // New matches first; they take priority for refreshed days.
    for m in new_matches {
        let Some(day) = day_offset(&m.commence_time, today) else {
            continue;
        };
        if !(0..WINDOW_DAYS).contains(&day) {
            continue;
        }
        if seen.insert(dedup_key(&m)) {
            buckets[day as usize].push(m);
        }
    }

    // Carry over history for days this run did not refresh, re-bucketed
    // against the current date.
    if let Some(prev) = previous {
        for bucket in prev.by_day.values() {
            for m in &bucket.matches {
                let Some(day) = day_offset(&m.commence_time, today) else {
                    continue;
                };
                if !(0..WINDOW_DAYS).contains(&day) {
                    continue;
                }
                if refreshed.contains(&(day as u8)) {
                    continue;
                }
                if seen.insert(dedup_key(m)) {
                    buckets[day as usize].push(m.clone());
                }
            }
        }
    }

    let total_matches: usize = buckets.iter().map(Vec::len).sum();
    let days_with_data = buckets.iter().filter(|b| !b.is_empty()).count();

    let mut by_day = BTreeMap::new();
    let mut all_matches = Vec::with_capacity(total_matches);
    for (offset, bucket) in buckets.into_iter().enumerate() {
        let date = today + ChronoDuration::days(offset as i64);
        all_matches.extend(bucket.iter().cloned());
        by_day.insert(
            offset.to_string(),
            DayBucket {
                date: date.format("%Y-%m-%d").to_string(),
                day_name: date.format("%A").to_string(),
                match_count: bucket.len(),
                matches: bucket,
            },
        );
    }
    // Empty commence times sort first.
    all_matches.sort_by(|a, b| a.commence_time.cmp(&b.commence_time));

    Window {
        meta: WindowMeta {
            updated_at: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            source: opts.source.clone(),
            total_matches,
            coverage_days: WINDOW_DAYS as u8,
            days_with_data,
            last_refreshed_days: refreshed.into_iter().collect(),
            error: no_input.then(|| "No data available".to_string()),
        },
        by_day,
        matches: all_matches,
    }
}
