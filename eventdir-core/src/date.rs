//! Flexible date and time parsing.
//!
//! Records arrive with dates in whatever shape the person who entered them
//! preferred. Everything downstream works with [`NaiveDate`]; this module is
//! the only place that looks at raw date strings.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("time pattern is valid"));

/// Layouts tried, in order, for input that is neither slash nor dash formatted.
const FREEFORM_LAYOUTS: &[&str] = &[
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%a %b %d %Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
];

/// Result of parsing a raw date string, tagged by the encoding it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "date", rename_all = "lowercase")]
pub enum ParsedDate {
    /// `DD/MM/YYYY`
    Slash(NaiveDate),
    /// `YYYY-MM-DD`, with any time or zone suffix ignored
    Iso(NaiveDate),
    /// One of the free-form layouts (RFC 2822, `March 5, 2025`, ...)
    Freeform(NaiveDate),
    Unparseable,
}

impl ParsedDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            ParsedDate::Slash(d) | ParsedDate::Iso(d) | ParsedDate::Freeform(d) => Some(d),
            ParsedDate::Unparseable => None,
        }
    }

    pub fn is_valid(self) -> bool {
        self.date().is_some()
    }
}

/// Parse a date in any of the supported encodings.
///
/// A `/` anywhere means day-first `DD/MM/YYYY`; a `-` means `YYYY-MM-DD`.
/// Neither falls through to the free-form layouts. Impossible calendar
/// dates (31/02/2025) are unparseable rather than rolled over.
pub fn parse_flexible_date(raw: &str) -> ParsedDate {
    let raw = raw.trim();
    if raw.is_empty() {
        return ParsedDate::Unparseable;
    }

    if raw.contains('/') {
        return parse_slash(raw).map_or(ParsedDate::Unparseable, ParsedDate::Slash);
    }

    if raw.contains('-') {
        return parse_iso(raw).map_or(ParsedDate::Unparseable, ParsedDate::Iso);
    }

    parse_freeform(raw).map_or(ParsedDate::Unparseable, ParsedDate::Freeform)
}

/// Shorthand for `parse_flexible_date(raw).date()` on optional fields.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|r| parse_flexible_date(r).date())
}

fn parse_slash(raw: &str) -> Option<NaiveDate> {
    // "25/12/2025 18:30" keeps only the date token
    let token = raw.split_whitespace().next()?;
    let mut parts = token.split('/');
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso(raw: &str) -> Option<NaiveDate> {
    let date_part = raw
        .split(|c: char| c == 'T' || c == 't' || c.is_whitespace())
        .next()?;
    let mut parts = date_part.split('-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_freeform(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_local().date());
    }

    FREEFORM_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(raw, layout).ok())
}

/// Parse an `H:MM`/`HH:MM` time of day (seconds, if present, are ignored).
///
/// Returns `None` for absent or out-of-range times; the record is then
/// treated as having no time, not as starting at midnight.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let caps = TIME_PATTERN.captures(raw)?;
    let hour = caps[1].parse::<u32>().ok()?;
    let minute = caps[2].parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Canonical zero-padded `HH:MM` form of a time string, if it parses.
///
/// Canonical times compare correctly as plain strings.
pub fn normalize_time(raw: &str) -> Option<String> {
    parse_time(raw).map(|t| t.format("%H:%M").to_string())
}

/// Today's date in the local timezone.
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// The Monday on or before `date`, or `None` if that falls before the
/// earliest representable date.
pub fn monday_of(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_signed(Duration::days(i64::from(
        date.weekday().num_days_from_monday(),
    )))
}

/// Number of days in the given month (1-based), or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from((next - first).num_days()).ok()
}
