//! Text and value normalization shared across the pipeline.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::record::NA;

static PLAYER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/player/[^/]+-(\d+)/").expect("valid regex"));

static RANK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#?(\d+)").expect("valid regex"));

/// Accepted input date formats, normalized to MM/DD/YYYY.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

/// Numeric player id from a profile URL (`/player/<slug>-<digits>/`).
pub fn extract_player_id(url: &str) -> String {
    PLAYER_ID_RE
        .captures(url)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| NA.to_string())
}

/// Trim, collapse newlines, and replace non-breaking spaces.
pub fn clean_text(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '\r')
        .map(|c| if c == '\n' || c == '\u{a0}' { ' ' } else { c })
        .collect();
    if cleaned.is_empty() {
        NA.to_string()
    } else {
        cleaned
    }
}

/// Prefix height values with an apostrophe so spreadsheet consumers never
/// coerce "6-3" into a date.
pub fn normalize_height(height: &str) -> String {
    if height.is_empty() || height == NA {
        return NA.to_string();
    }
    let height = height.trim().trim_matches(|c| c == '\'' || c == '"');
    let short_numeric = height.len() <= 4 && height.chars().any(|c| c.is_ascii_digit());
    if height.contains('-') || height.contains('\'') || short_numeric {
        format!("'{height}")
    } else {
        height.to_string()
    }
}

/// First run of digits after an optional `#` marker.
pub fn parse_rank(text: &str) -> String {
    RANK_RE
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| NA.to_string())
}

/// Normalize a date string to MM/DD/YYYY. Unparseable input passes
/// through verbatim so downstream consumers can still see it.
pub fn normalize_date(date: &str) -> String {
    if date.is_empty() {
        return NA.to_string();
    }
    let date = clean_text(date);
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(&date, fmt) {
            return parsed.format("%m/%d/%Y").to_string();
        }
    }
    date
}

/// A commitment/signing date belongs to a recruiting class only if it
/// falls strictly before September 1 of that year. Dates that survived
/// normalization but still don't parse are let through; the sentinel is
/// always rejected.
pub fn before_class_cutoff(date: &str, recruiting_year: i32) -> bool {
    if date == NA {
        return false;
    }
    match NaiveDate::parse_from_str(date, "%m/%d/%Y") {
        Ok(parsed) => {
            let cutoff = NaiveDate::from_ymd_opt(recruiting_year, 9, 1).expect("valid cutoff date");
            parsed < cutoff
        }
        Err(_) => true,
    }
}
