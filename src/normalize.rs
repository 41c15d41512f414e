use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::model::{Btts, H2h, Markets, Match, Totals, unknown_league};

const TOTALS_LINE: f64 = 2.5;

/// Normalize one raw upstream record into the canonical shape.
///
/// Returns `None` when the record is unusable (no team-name pair in any
/// known dialect). Everything else degrades field by field: a bad price or
/// date never discards the record.
pub fn normalize(raw: &Value) -> Option<Match> {
    normalize_record(raw, None)
}

/// Like [`normalize`], but with an already-known market map that outranks
/// every dialect extractor. `normalize` seeds this from the record's own
/// `markets`/`odds` object.
pub fn normalize_record(raw: &Value, known: Option<&Markets>) -> Option<Match> {
    raw.as_object()?;
    let (home_team, away_team) = extract_teams(raw)?;
    let commence_time = extract_commence_time(raw).unwrap_or_default();
    let league = extract_league(raw);
    let teams = TeamPair {
        home: &home_team,
        away: &away_team,
    };

    let markets = Markets {
        h2h: extract_h2h(raw, &teams, known),
        totals: extract_totals(raw, known),
        btts: extract_btts(raw, known),
    };

    Some(Match {
        home_team,
        away_team,
        commence_time,
        league,
        markets,
    })
}

struct TeamPair<'a> {
    home: &'a str,
    away: &'a str,
}

// ---------------------------------------------------------------------------
// Team names
// ---------------------------------------------------------------------------

fn extract_teams(raw: &Value) -> Option<(String, String)> {
    for (home_key, away_key) in [
        ("home_team", "away_team"),
        ("home", "away"),
        ("homeTeam", "awayTeam"),
    ] {
        let home = team_name(field(raw, home_key));
        let away = team_name(field(raw, away_key));
        if let (Some(home), Some(away)) = (home, away) {
            return Some((home, away));
        }
    }
    None
}

fn team_name(v: Option<&Value>) -> Option<String> {
    let name = match v? {
        Value::String(s) => s.trim(),
        // Some feeds nest the team as an object with a `name` field.
        Value::Object(obj) => obj.get("name").and_then(Value::as_str)?.trim(),
        _ => return None,
    };
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

// ---------------------------------------------------------------------------
// Kickoff date
// ---------------------------------------------------------------------------

fn extract_commence_time(raw: &Value) -> Option<String> {
    let time_field = field_str(raw, "time");
    for key in ["commence_time", "date", "datetime", "start_time"] {
        if let Some(candidate) = field_str(raw, key)
            && let Some(ts) = parse_commence_time(candidate, time_field)
        {
            return Some(ts);
        }
    }
    None
}

/// Reformat any recognized upstream date into `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Compact `DD/MM/YY` (two-digit year) and `DD/MM/YYYY` dates may carry a
/// separate `HH:MM` time field; missing time means midnight.
fn parse_commence_time(raw: &str, time_field: Option<&str>) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().format("%Y-%m-%dT%H:%M:%SZ").to_string());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(naive.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(compose_day_time(date, time_field));
    }

    // football-data.co.uk convention: DD/MM/YY for short values, DD/MM/YYYY
    // otherwise, with kickoff time in a separate column.
    let fmt = if trimmed.len() <= 8 { "%d/%m/%y" } else { "%d/%m/%Y" };
    let date = NaiveDate::parse_from_str(trimmed, fmt).ok()?;
    Some(compose_day_time(date, time_field))
}

fn compose_day_time(date: NaiveDate, time_field: Option<&str>) -> String {
    let time = time_field
        .and_then(|t| NaiveTime::parse_from_str(t.trim(), "%H:%M").ok())
        .unwrap_or(NaiveTime::MIN);
    NaiveDateTime::new(date, time)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

fn extract_league(raw: &Value) -> String {
    for key in ["league", "competition", "tournament", "div"] {
        if let Some(name) = field_str(raw, key) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            return league_display_name(name)
                .map(str::to_string)
                .unwrap_or_else(|| name.to_string());
        }
    }
    unknown_league()
}

/// football-data.co.uk division codes. Unmapped codes pass through unchanged.
fn league_display_name(code: &str) -> Option<&'static str> {
    match code {
        "E0" => Some("ENG Premier League"),
        "E1" => Some("ENG Championship"),
        "E2" => Some("ENG League 1"),
        "E3" => Some("ENG League 2"),
        "EC" => Some("ENG Conference"),
        "SC0" => Some("SCO Premiership"),
        "SC1" => Some("SCO Championship"),
        "SC2" => Some("SCO League 1"),
        "SC3" => Some("SCO League 2"),
        "D1" => Some("DEU Bundesliga"),
        "D2" => Some("DEU 2. Bundesliga"),
        "I1" => Some("ITA Serie A"),
        "I2" => Some("ITA Serie B"),
        "SP1" => Some("ESP La Liga"),
        "SP2" => Some("ESP Segunda"),
        "F1" => Some("FRA Ligue 1"),
        "F2" => Some("FRA Ligue 2"),
        "N1" => Some("NLD Eredivisie"),
        "B1" => Some("BEL First Division A"),
        "P1" => Some("PRT Primeira Liga"),
        "T1" => Some("TUR Super Lig"),
        "G1" => Some("GRC Super League"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// h2h (1X2)
// ---------------------------------------------------------------------------

/// Partial 1X2 triple as read from one candidate source. The first source
/// that yields any price wins the market; lower-priority sources are never
/// consulted even if the winner turns out incomplete.
#[derive(Debug, Default)]
struct OddsTriple {
    home: Option<f64>,
    draw: Option<f64>,
    away: Option<f64>,
}

impl OddsTriple {
    fn any(&self) -> bool {
        self.home.is_some() || self.draw.is_some() || self.away.is_some()
    }

    fn complete(&self) -> bool {
        self.home.is_some() && self.away.is_some()
    }

    /// Home and away prices are required; draw may be absent.
    fn accept(self) -> Option<H2h> {
        Some(H2h {
            home: round2(self.home?),
            draw: self.draw.map(round2),
            away: round2(self.away?),
        })
    }
}

type H2hSource = fn(&Value, &TeamPair) -> OddsTriple;

/// Priority order per source dialect; first source yielding any value wins.
const H2H_SOURCES: &[H2hSource] = &[
    h2h_canonical_object,
    h2h_sharp_book,
    h2h_named_bookmaker,
    h2h_market_average,
    h2h_markets_array,
    h2h_bookmakers_array,
    h2h_direct_fields,
];

fn extract_h2h(raw: &Value, teams: &TeamPair, known: Option<&Markets>) -> Option<H2h> {
    if let Some(h2h) = known.and_then(|m| m.h2h.as_ref()) {
        return Some(h2h.clone());
    }
    H2H_SOURCES
        .iter()
        .map(|source| source(raw, teams))
        .find(OddsTriple::any)
        .and_then(OddsTriple::accept)
}

fn h2h_canonical_object(raw: &Value, _teams: &TeamPair) -> OddsTriple {
    let Some(body) = market_map_body(raw, "h2h") else {
        return OddsTriple::default();
    };
    triple_from_body(body)
}

fn h2h_sharp_book(raw: &Value, _teams: &TeamPair) -> OddsTriple {
    for (h, d, a) in [("PSH", "PSD", "PSA"), ("PH", "PD", "PA")] {
        let triple = triple_from_columns(raw, h, d, a);
        if triple.any() {
            return triple;
        }
    }
    OddsTriple::default()
}

fn h2h_named_bookmaker(raw: &Value, _teams: &TeamPair) -> OddsTriple {
    triple_from_columns(raw, "B365H", "B365D", "B365A")
}

fn h2h_market_average(raw: &Value, _teams: &TeamPair) -> OddsTriple {
    triple_from_columns(raw, "AvgH", "AvgD", "AvgA")
}

fn h2h_markets_array(raw: &Value, teams: &TeamPair) -> OddsTriple {
    let Some(entries) = field(raw, "markets").and_then(Value::as_array) else {
        return OddsTriple::default();
    };
    for entry in entries {
        if !is_match_winner_market(entry) {
            continue;
        }
        let triple = triple_from_market_entry(entry, teams);
        if triple.any() {
            return triple;
        }
    }
    OddsTriple::default()
}

/// One level deeper: bookmaker -> markets -> outcomes. The first bookmaker
/// carrying a complete triple wins.
fn h2h_bookmakers_array(raw: &Value, teams: &TeamPair) -> OddsTriple {
    let Some(bookmakers) = field(raw, "bookmakers").and_then(Value::as_array) else {
        return OddsTriple::default();
    };
    for bookmaker in bookmakers {
        let Some(markets) = bookmaker.get("markets").and_then(Value::as_array) else {
            continue;
        };
        for entry in markets {
            if !is_match_winner_market(entry) {
                continue;
            }
            let triple = triple_from_market_entry(entry, teams);
            if triple.complete() {
                return triple;
            }
        }
    }
    OddsTriple::default()
}

fn h2h_direct_fields(raw: &Value, _teams: &TeamPair) -> OddsTriple {
    let explicit = triple_from_columns(raw, "home_odds", "draw_odds", "away_odds");
    if explicit.any() {
        return explicit;
    }
    triple_from_columns(raw, "1", "X", "2")
}

fn is_match_winner_market(entry: &Value) -> bool {
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();
    let kind = entry
        .get("type")
        .and_then(Value::as_str)
        .or_else(|| entry.get("key").and_then(Value::as_str))
        .unwrap_or_default()
        .to_ascii_lowercase();
    name == "1x2" || kind == "h2h" || name.contains("match winner") || kind.contains("match winner")
}

fn triple_from_columns(raw: &Value, home: &str, draw: &str, away: &str) -> OddsTriple {
    OddsTriple {
        home: field_price(raw, home),
        draw: field_price(raw, draw),
        away: field_price(raw, away),
    }
}

/// Market entries either carry a canonical `odds` body or an `outcomes`
/// list whose labels are matched against the team names or 1/X/2 keywords.
fn triple_from_market_entry(entry: &Value, teams: &TeamPair) -> OddsTriple {
    if let Some(body) = entry.get("odds").filter(|v| v.is_object()) {
        let triple = triple_from_body(body);
        if triple.any() {
            return triple;
        }
    }
    let Some(outcomes) = entry.get("outcomes").and_then(Value::as_array) else {
        return OddsTriple::default();
    };
    let mut triple = OddsTriple::default();
    for outcome in outcomes {
        let Some(label) = outcome_label(outcome) else {
            continue;
        };
        let Some(price) = outcome_price(outcome) else {
            continue;
        };
        match outcome_slot(label, teams) {
            Some(Slot::Home) => triple.home = triple.home.or(Some(price)),
            Some(Slot::Draw) => triple.draw = triple.draw.or(Some(price)),
            Some(Slot::Away) => triple.away = triple.away.or(Some(price)),
            None => {}
        }
    }
    triple
}

fn triple_from_body(body: &Value) -> OddsTriple {
    OddsTriple {
        home: body.get("home").and_then(price),
        draw: body.get("draw").and_then(price),
        away: body.get("away").and_then(price),
    }
}

enum Slot {
    Home,
    Draw,
    Away,
}

fn outcome_slot(label: &str, teams: &TeamPair) -> Option<Slot> {
    let label = label.trim();
    if label.eq_ignore_ascii_case(teams.home) {
        return Some(Slot::Home);
    }
    if label.eq_ignore_ascii_case(teams.away) {
        return Some(Slot::Away);
    }
    match label.to_ascii_lowercase().as_str() {
        "1" | "home" => Some(Slot::Home),
        "x" | "draw" | "tie" => Some(Slot::Draw),
        "2" | "away" => Some(Slot::Away),
        _ => None,
    }
}

fn outcome_label(outcome: &Value) -> Option<&str> {
    outcome
        .get("name")
        .or_else(|| outcome.get("label"))
        .and_then(Value::as_str)
}

fn outcome_price(outcome: &Value) -> Option<f64> {
    for key in ["price", "odds", "value"] {
        if let Some(p) = outcome.get(key).and_then(price) {
            return Some(p);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// totals (over/under 2.5)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct OverUnder {
    over: Option<f64>,
    under: Option<f64>,
    line: Option<f64>,
}

impl OverUnder {
    fn any(&self) -> bool {
        self.over.is_some() || self.under.is_some()
    }

    /// Both sides required; a supplied line must be the 2.5-goal line.
    fn accept(self) -> Option<Totals> {
        if let Some(line) = self.line
            && (line - TOTALS_LINE).abs() > 1e-9
        {
            return None;
        }
        Some(Totals {
            over: round2(self.over?),
            under: round2(self.under?),
            line: TOTALS_LINE,
        })
    }
}

type TotalsSource = fn(&Value) -> OverUnder;

const TOTALS_SOURCES: &[TotalsSource] = &[
    totals_canonical_object,
    totals_sharp_book,
    totals_named_bookmaker,
    totals_market_average,
    totals_markets_array,
    totals_bookmakers_array,
];

fn extract_totals(raw: &Value, known: Option<&Markets>) -> Option<Totals> {
    if let Some(totals) = known.and_then(|m| m.totals.as_ref()) {
        return Some(totals.clone());
    }
    TOTALS_SOURCES
        .iter()
        .map(|source| source(raw))
        .find(OverUnder::any)
        .and_then(OverUnder::accept)
}

fn totals_canonical_object(raw: &Value) -> OverUnder {
    let Some(body) = market_map_body(raw, "totals") else {
        return OverUnder::default();
    };
    over_under_from_body(body)
}

fn totals_sharp_book(raw: &Value) -> OverUnder {
    over_under_from_columns(raw, "P>2.5", "P<2.5")
}

fn totals_named_bookmaker(raw: &Value) -> OverUnder {
    over_under_from_columns(raw, "B365>2.5", "B365<2.5")
}

fn totals_market_average(raw: &Value) -> OverUnder {
    over_under_from_columns(raw, "Avg>2.5", "Avg<2.5")
}

fn totals_markets_array(raw: &Value) -> OverUnder {
    let Some(entries) = field(raw, "markets").and_then(Value::as_array) else {
        return OverUnder::default();
    };
    for entry in entries {
        if !is_totals_market(entry) {
            continue;
        }
        let pair = over_under_from_market_entry(entry);
        if pair.any() {
            return pair;
        }
    }
    OverUnder::default()
}

fn totals_bookmakers_array(raw: &Value) -> OverUnder {
    let Some(bookmakers) = field(raw, "bookmakers").and_then(Value::as_array) else {
        return OverUnder::default();
    };
    for bookmaker in bookmakers {
        let Some(markets) = bookmaker.get("markets").and_then(Value::as_array) else {
            continue;
        };
        for entry in markets {
            if !is_totals_market(entry) {
                continue;
            }
            let pair = over_under_from_market_entry(entry);
            if pair.over.is_some() && pair.under.is_some() {
                return pair;
            }
        }
    }
    OverUnder::default()
}

fn is_totals_market(entry: &Value) -> bool {
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_ascii_lowercase();
    let kind = entry
        .get("type")
        .and_then(Value::as_str)
        .or_else(|| entry.get("key").and_then(Value::as_str))
        .unwrap_or_default()
        .to_ascii_lowercase();
    name.contains("over") || kind.contains("total")
}

fn over_under_from_columns(raw: &Value, over: &str, under: &str) -> OverUnder {
    OverUnder {
        over: field_price(raw, over),
        under: field_price(raw, under),
        line: None,
    }
}

fn over_under_from_market_entry(entry: &Value) -> OverUnder {
    let entry_line = entry
        .get("line")
        .or_else(|| entry.get("point"))
        .and_then(as_f64_any);
    if let Some(body) = entry.get("odds").filter(|v| v.is_object()) {
        let mut pair = over_under_from_body(body);
        if pair.any() {
            pair.line = pair.line.or(entry_line);
            return pair;
        }
    }
    let Some(outcomes) = entry.get("outcomes").and_then(Value::as_array) else {
        return OverUnder::default();
    };
    let mut pair = OverUnder {
        line: entry_line,
        ..OverUnder::default()
    };
    for outcome in outcomes {
        let Some(label) = outcome_label(outcome) else {
            continue;
        };
        let Some(price) = outcome_price(outcome) else {
            continue;
        };
        let label = label.trim().to_ascii_lowercase();
        if label.starts_with("over") {
            pair.over = pair.over.or(Some(price));
        } else if label.starts_with("under") {
            pair.under = pair.under.or(Some(price));
        }
        if pair.line.is_none() {
            pair.line = outcome.get("point").and_then(as_f64_any);
        }
    }
    pair
}

fn over_under_from_body(body: &Value) -> OverUnder {
    OverUnder {
        over: body.get("over").and_then(price),
        under: body.get("under").and_then(price),
        line: body.get("line").and_then(as_f64_any),
    }
}

// ---------------------------------------------------------------------------
// btts (both teams to score)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct YesNo {
    yes: Option<f64>,
    no: Option<f64>,
}

impl YesNo {
    fn any(&self) -> bool {
        self.yes.is_some() || self.no.is_some()
    }

    fn accept(self) -> Option<Btts> {
        Some(Btts {
            yes: round2(self.yes?),
            no: round2(self.no?),
        })
    }
}

type BttsSource = fn(&Value) -> YesNo;

const BTTS_SOURCES: &[BttsSource] = &[btts_canonical_object, btts_markets_array, btts_direct_fields];

fn extract_btts(raw: &Value, known: Option<&Markets>) -> Option<Btts> {
    if let Some(btts) = known.and_then(|m| m.btts.as_ref()) {
        return Some(btts.clone());
    }
    BTTS_SOURCES
        .iter()
        .map(|source| source(raw))
        .find(YesNo::any)
        .and_then(YesNo::accept)
}

fn btts_canonical_object(raw: &Value) -> YesNo {
    let Some(body) = market_map_body(raw, "btts") else {
        return YesNo::default();
    };
    yes_no_from_body(body)
}

fn btts_markets_array(raw: &Value) -> YesNo {
    let Some(entries) = field(raw, "markets").and_then(Value::as_array) else {
        return YesNo::default();
    };
    for entry in entries {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !(name.contains("btts") || name.contains("both")) {
            continue;
        }
        if let Some(body) = entry.get("odds").filter(|v| v.is_object()) {
            let pair = yes_no_from_body(body);
            if pair.any() {
                return pair;
            }
        }
        let Some(outcomes) = entry.get("outcomes").and_then(Value::as_array) else {
            continue;
        };
        let mut pair = YesNo::default();
        for outcome in outcomes {
            let Some(label) = outcome_label(outcome) else {
                continue;
            };
            let Some(price) = outcome_price(outcome) else {
                continue;
            };
            match label.trim().to_ascii_lowercase().as_str() {
                "yes" => pair.yes = pair.yes.or(Some(price)),
                "no" => pair.no = pair.no.or(Some(price)),
                _ => {}
            }
        }
        if pair.any() {
            return pair;
        }
    }
    YesNo::default()
}

fn btts_direct_fields(raw: &Value) -> YesNo {
    YesNo {
        yes: field_price(raw, "yes"),
        no: field_price(raw, "no"),
    }
}

fn yes_no_from_body(body: &Value) -> YesNo {
    YesNo {
        yes: body.get("yes").and_then(price),
        no: body.get("no").and_then(price),
    }
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Canonical market body under a `markets` or `odds` object, when the record
/// already carries the normalized shape.
fn market_map_body<'a>(raw: &'a Value, market: &str) -> Option<&'a Value> {
    for key in ["markets", "odds"] {
        if let Some(body) = field(raw, key)
            .filter(|v| v.is_object())
            .and_then(|v| v.get(market))
            .filter(|v| v.is_object())
        {
            return Some(body);
        }
    }
    None
}

/// Field lookup tolerant of header casing (`Date` vs `date`, `HomeTeam` vs
/// `homeTeam`). Exact key wins over a case-insensitive hit.
fn field<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    let obj = raw.as_object()?;
    if let Some(v) = obj.get(key) {
        return Some(v);
    }
    obj.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

fn field_str<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    field(raw, key).and_then(Value::as_str)
}

fn field_price(raw: &Value, key: &str) -> Option<f64> {
    field(raw, key).and_then(price)
}

/// Decimal price: numeric or numeric string, strictly positive. Anything
/// malformed is treated as missing.
fn price(v: &Value) -> Option<f64> {
    as_f64_any(v).filter(|p| *p > 0.0)
}

fn as_f64_any(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{normalize, parse_commence_time, round2};

    #[test]
    fn discards_record_without_team_pair() {
        assert!(normalize(&json!({"home_team": "Arsenal"})).is_none());
        assert!(normalize(&json!({"HomeTeam": "", "AwayTeam": "Chelsea"})).is_none());
        assert!(normalize(&json!("not an object")).is_none());
    }

    #[test]
    fn nested_team_objects_are_probed() {
        let m = normalize(&json!({
            "home": {"name": "Ajax"},
            "away": {"name": "PSV"}
        }))
        .expect("valid teams");
        assert_eq!(m.home_team, "Ajax");
        assert_eq!(m.away_team, "PSV");
        assert_eq!(m.league, "Unknown");
        assert!(m.commence_time.is_empty());
    }

    #[test]
    fn sharp_book_outranks_named_bookmaker_and_average() {
        let m = normalize(&json!({
            "HomeTeam": "Arsenal",
            "AwayTeam": "Chelsea",
            "PSH": 1.80, "PSD": 3.40, "PSA": 4.50,
            "B365H": 1.85, "B365D": 3.30, "B365A": 4.40,
            "AvgH": 1.82, "AvgD": 3.35, "AvgA": 4.45
        }))
        .expect("valid record");
        let h2h = m.markets.h2h.expect("h2h");
        assert_eq!(h2h.home, 1.80);
        assert_eq!(h2h.draw, Some(3.40));
        assert_eq!(h2h.away, 4.50);
    }

    #[test]
    fn partial_winner_blocks_lower_priority_sources() {
        // Pinnacle yields a value, so Bet365 must not be consulted even
        // though the Pinnacle triple is unusable.
        let m = normalize(&json!({
            "HomeTeam": "Arsenal",
            "AwayTeam": "Chelsea",
            "PSH": 1.80,
            "B365H": 1.85, "B365D": 3.30, "B365A": 4.40
        }))
        .expect("valid record");
        assert!(m.markets.h2h.is_none());
    }

    #[test]
    fn draw_price_is_optional() {
        let m = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "home_odds": 1.5, "away_odds": 2.5
        }))
        .expect("valid record");
        let h2h = m.markets.h2h.expect("h2h");
        assert_eq!(h2h.draw, None);
    }

    #[test]
    fn markets_array_matches_outcomes_by_team_name_and_keyword() {
        let m = normalize(&json!({
            "home_team": "Arsenal",
            "away_team": "Chelsea",
            "markets": [
                {"name": "1X2", "outcomes": [
                    {"name": "Arsenal", "price": 1.91},
                    {"name": "X", "price": 3.5},
                    {"name": "Chelsea", "price": "4.2"}
                ]}
            ]
        }))
        .expect("valid record");
        let h2h = m.markets.h2h.expect("h2h");
        assert_eq!(h2h.home, 1.91);
        assert_eq!(h2h.draw, Some(3.5));
        assert_eq!(h2h.away, 4.2);
    }

    #[test]
    fn bookmakers_array_takes_first_complete_triple() {
        let m = normalize(&json!({
            "home_team": "Lyon",
            "away_team": "Lille",
            "bookmakers": [
                {"markets": [{"key": "h2h", "outcomes": [
                    {"name": "home", "price": 2.0}
                ]}]},
                {"markets": [{"key": "h2h", "outcomes": [
                    {"name": "home", "price": 2.1},
                    {"name": "draw", "price": 3.2},
                    {"name": "away", "price": 3.6}
                ]}]}
            ]
        }))
        .expect("valid record");
        let h2h = m.markets.h2h.expect("h2h");
        assert_eq!(h2h.home, 2.1);
    }

    #[test]
    fn direct_numeral_fields_are_last_resort() {
        let m = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "1": "2.05", "X": "3.30", "2": "3.80"
        }))
        .expect("valid record");
        let h2h = m.markets.h2h.expect("h2h");
        assert_eq!(h2h.home, 2.05);
        assert_eq!(h2h.draw, Some(3.30));
        assert_eq!(h2h.away, 3.80);
    }

    #[test]
    fn canonical_markets_object_outranks_columns() {
        let m = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "markets": {"h2h": {"home": 1.7, "draw": 3.6, "away": 5.0}},
            "B365H": 9.0, "B365D": 9.0, "B365A": 9.0
        }))
        .expect("valid record");
        assert_eq!(m.markets.h2h.expect("h2h").home, 1.7);
    }

    #[test]
    fn malformed_price_is_treated_as_missing() {
        let m = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "B365H": "n/a", "B365D": 3.3, "B365A": 4.4,
            "AvgH": 1.8, "AvgD": 3.3, "AvgA": 4.4
        }))
        .expect("valid record");
        // Bet365 still yielded values (draw/away), so it wins and fails.
        assert!(m.markets.h2h.is_none());
    }

    #[test]
    fn totals_requires_both_sides_on_the_default_line() {
        let full = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "P>2.5": 1.95, "P<2.5": 1.85
        }))
        .expect("valid record");
        let totals = full.markets.totals.expect("totals");
        assert_eq!(totals.over, 1.95);
        assert_eq!(totals.line, 2.5);

        let one_sided = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "B365>2.5": 1.95
        }))
        .expect("valid record");
        assert!(one_sided.markets.totals.is_none());
    }

    #[test]
    fn totals_rejects_other_lines() {
        let m = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "markets": [
                {"name": "Over/Under", "line": 3.5, "odds": {"over": 2.4, "under": 1.55}}
            ]
        }))
        .expect("valid record");
        assert!(m.markets.totals.is_none());
    }

    #[test]
    fn btts_from_markets_array_and_direct_fields() {
        let arr = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "markets": [
                {"name": "BTTS", "odds": {"yes": 1.72, "no": 2.05}}
            ]
        }))
        .expect("valid record");
        let btts = arr.markets.btts.expect("btts");
        assert_eq!(btts.yes, 1.72);

        let direct = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "yes": 1.8, "no": 1.9
        }))
        .expect("valid record");
        assert!(direct.markets.btts.is_some());
    }

    #[test]
    fn compact_dates_follow_year_width_convention() {
        assert_eq!(
            parse_commence_time("16/01/25", None).as_deref(),
            Some("2025-01-16T00:00:00Z")
        );
        assert_eq!(
            parse_commence_time("16/01/2025", Some("19:30")).as_deref(),
            Some("2025-01-16T19:30:00Z")
        );
        assert_eq!(parse_commence_time("not a date", None), None);
    }

    #[test]
    fn iso_dates_are_reformatted_to_canonical_utc() {
        assert_eq!(
            parse_commence_time("2025-01-16T19:30:00+01:00", None).as_deref(),
            Some("2025-01-16T18:30:00Z")
        );
        assert_eq!(
            parse_commence_time("2025-01-16 19:30", None).as_deref(),
            Some("2025-01-16T19:30:00Z")
        );
    }

    #[test]
    fn unparseable_date_keeps_record_with_empty_commence_time() {
        let m = normalize(&json!({
            "home_team": "A", "away_team": "B",
            "date": "someday soon"
        }))
        .expect("valid record");
        assert!(m.commence_time.is_empty());
    }

    #[test]
    fn league_codes_map_and_unknown_codes_pass_through() {
        let mapped = normalize(&json!({
            "HomeTeam": "A", "AwayTeam": "B", "Div": "SP1"
        }))
        .expect("valid record");
        assert_eq!(mapped.league, "ESP La Liga");

        let passthrough = normalize(&json!({
            "home_team": "A", "away_team": "B", "competition": "ZZ9"
        }))
        .expect("valid record");
        assert_eq!(passthrough.league, "ZZ9");
    }

    #[test]
    fn prices_round_to_two_decimals() {
        assert_eq!(round2(1.8349), 1.83);
        assert_eq!(round2(1.835), 1.84);
    }
}
