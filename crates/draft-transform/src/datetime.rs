//! Day-first calendar date parsing.
//!
//! Ambiguous numeric dates are read day before month, so `03/04/2024` is
//! 3 April. When that reading is impossible (`12/25/2024`) the month-first
//! reading is tried. A trailing time of day is accepted and dropped.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime};

/// Named-month layouts, tried in order after numeric layouts fail.
const TEXT_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%d/%b/%Y",
    "%d%b%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%A, %d %B %Y",
    "%A %d %B %Y",
    "%a, %d %b %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p"];

/// Parse a date-like string, reading ambiguous numeric dates day first.
///
/// Returns `None` when no supported layout matches.
pub fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    let date_part = strip_time_of_day(trimmed);
    parse_numeric_date(date_part).or_else(|| parse_text_date(date_part))
}

/// Long display form used in rendered documents, e.g. `05 March 2024`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%d %B %Y").to_string()
}

/// Drop a trailing `T10:30` / ` 10:30:00` / ` 9:30 PM` component when the tail
/// parses as a time of day.
fn strip_time_of_day(value: &str) -> &str {
    if let Some(idx) = value.find('T') {
        let (date, time) = (&value[..idx], &value[idx + 1..]);
        if is_time_of_day(time) {
            return date.trim_end();
        }
    }
    // Times with an AM/PM marker contain one space of their own.
    let mut candidates = value.rmatch_indices(' ').map(|(idx, _)| idx);
    for _ in 0..2 {
        let Some(idx) = candidates.next() else {
            break;
        };
        let (date, time) = (&value[..idx], &value[idx + 1..]);
        if is_time_of_day(time) {
            return date.trim_end();
        }
    }
    value
}

fn is_time_of_day(value: &str) -> bool {
    let value = value.trim_end_matches('Z');
    TIME_FORMATS
        .iter()
        .any(|format| NaiveTime::parse_from_str(value, format).is_ok())
}

/// `YYYY-MM-DD`, `YYYYMMDD`, and day-first `DD/MM/YYYY` style dates with
/// `/`, `-` or `.` separators.
fn parse_numeric_date(value: &str) -> Option<NaiveDate> {
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        let year = value[..4].parse().ok()?;
        let month = value[4..6].parse().ok()?;
        let day = value[6..].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let separator = value.chars().find(|c| matches!(c, '/' | '-' | '.'))?;
    let parts: Vec<&str> = value.split(separator).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    if parts[0].len() == 4 {
        let year = parts[0].parse().ok()?;
        let month = parts[1].parse().ok()?;
        let day = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }
    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year = expand_year(parts[2])?;
    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

/// Two-digit years pivot at 69: `00`-`68` are 2000s, `69`-`99` are 1900s.
fn expand_year(value: &str) -> Option<i32> {
    let year: i32 = value.parse().ok()?;
    match value.len() {
        4 => Some(year),
        2 if year < 69 => Some(2000 + year),
        2 => Some(1900 + year),
        _ => None,
    }
}

fn parse_text_date(value: &str) -> Option<NaiveDate> {
    if !value.chars().any(char::is_alphabetic) {
        return None;
    }
    let normalized = strip_ordinal_suffixes(value);
    TEXT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&normalized, format).ok())
        .filter(|date| date.year() >= 1000)
}

/// `1st`, `22nd`, `3rd`, `5th` become `1`, `22`, `3`, `5`.
fn strip_ordinal_suffixes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut tokens = value.split(' ').peekable();
    while let Some(token) = tokens.next() {
        let digits = token.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        let suffix = &token[digits.len()..];
        let is_ordinal = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && matches!(suffix.to_ascii_lowercase().as_str(), "st" | "nd" | "rd" | "th");
        out.push_str(if is_ordinal { digits } else { token });
        if tokens.peek().is_some() {
            out.push(' ');
        }
    }
    out
}
