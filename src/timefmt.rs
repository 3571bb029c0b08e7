//! Server timestamp normalization.
//!
//! The backend stores naive datetimes and serializes them without an offset.
//! Those are UTC. Every place a server timestamp is shown goes through
//! [`parse_server_timestamp`] so naive values are never read as local time.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

static TZ_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[zZ]|([+\-])(\d{2}):?(\d{2}))$").unwrap());

static SPACE_SEPARATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}").unwrap());

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// How much of the instant to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    #[default]
    DateTime,
    DateOnly,
}

/// The part after the date, where an offset may live. Date-only strings have none.
fn time_part(raw: &str) -> Option<&str> {
    raw.get(10..).and_then(|rest| rest.strip_prefix(['T', ' ']))
}

/// True when the timestamp already names its zone (`Z` or a `±HH:MM` offset).
pub fn has_timezone(raw: &str) -> bool {
    time_part(raw.trim()).is_some_and(|t| TZ_SUFFIX.is_match(t))
}

/// Canonical form: `T` separator, and `Z` appended when no zone is present.
/// Strings that already carry a zone are returned unchanged.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if has_timezone(trimmed) {
        return trimmed.to_string();
    }
    let mut s = trimmed.to_string();
    if SPACE_SEPARATED.is_match(&s) {
        s.replace_range(10..11, "T");
    }
    s.push('Z');
    s
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: i64 = s.parse().ok()?;
    match s.len() {
        10 => DateTime::from_timestamp(n, 0),
        13 => DateTime::from_timestamp_millis(n),
        _ => None,
    }
}

/// Parse a server timestamp to an instant. Returns `None` for malformed input.
///
/// Accepts ISO-like strings with or without seconds, fractions, a `T` or space
/// separator and an offset, plus 10-digit epoch seconds and 13-digit epoch
/// milliseconds.
pub fn parse_server_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(epoch) = parse_epoch(trimmed) {
        return Some(epoch);
    }

    let normalized = normalize(trimmed);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }

    let caps = TZ_SUFFIX.captures(&normalized)?;
    let whole = caps.get(0)?;
    let body = &normalized[..whole.start()];
    let naive = parse_naive(body)?;

    let offset = match (caps.get(1), caps.get(2), caps.get(3)) {
        (Some(sign), Some(hh), Some(mm)) => {
            let hours: i32 = hh.as_str().parse().ok()?;
            let minutes: i32 = mm.as_str().parse().ok()?;
            let secs = hours * 3600 + minutes * 60;
            let secs = if sign.as_str() == "-" { -secs } else { secs };
            FixedOffset::east_opt(secs)?
        }
        _ => FixedOffset::east_opt(0)?,
    };
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a server timestamp in the given zone. Malformed input is shown raw.
pub fn format_in<Tz: TimeZone>(raw: &str, style: DateStyle, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match parse_server_timestamp(raw) {
        Some(instant) => {
            let local = instant.with_timezone(tz);
            match style {
                DateStyle::DateTime => local.format("%b %-d, %Y, %H:%M").to_string(),
                DateStyle::DateOnly => local.format("%b %-d, %Y").to_string(),
            }
        }
        None => raw.trim().to_string(),
    }
}

/// Render a server timestamp in the user's local time zone.
pub fn format_local(raw: &str, style: DateStyle) -> String {
    format_in(raw, style, &Local)
}

/// Same as [`format_local`] for optional fields; absent renders as empty.
pub fn format_opt(raw: Option<&str>, style: DateStyle) -> String {
    raw.map(|r| format_local(r, style)).unwrap_or_default()
}
