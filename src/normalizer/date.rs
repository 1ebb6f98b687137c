//! Publication date parsing.
//!
//! Feeds in the wild use a handful of date layouts. They are tried in a fixed
//! order and the first one that parses wins.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// `Mon, 02 Jan 2006 15:04:05 -0700` or `... GMT`
    Rfc1123,
    /// `Mon, 02 Jan 2006 15:04:05 CEST`
    Rfc1123ZoneName,
    /// `2006-01-02T15:04:05Z`, `2006-01-02T15:04:05-07:00`
    Rfc3339,
    /// `2006-01-02T15:04:05-0700`
    Rfc3339NoColon,
    /// `2006-01-02 15:04:05 -0700`
    SpacedOffset,
    /// `2006-01-02 15:04:05`, read as UTC
    SpacedNaive,
    /// `02 Jan 2006 15:04:05 MST`
    DayFirstZoneName,
}

const LAYOUTS: [Layout; 7] = [
    Layout::Rfc1123,
    Layout::Rfc1123ZoneName,
    Layout::Rfc3339,
    Layout::Rfc3339NoColon,
    Layout::SpacedOffset,
    Layout::SpacedNaive,
    Layout::DayFirstZoneName,
];

const DAY_FIRST: &str = "%d %b %Y %H:%M:%S%.f";
const DAY_FIRST_OFFSET: &str = "%d %b %Y %H:%M:%S%.f %z";

impl Layout {
    fn parse(self, s: &str) -> Option<DateTime<Utc>> {
        match self {
            Layout::Rfc1123 => parse_rfc2822(s)
                .or_else(|| parse_rfc2822(strip_weekday(s)?))
                .or_else(|| {
                    DateTime::parse_from_str(strip_weekday(s)?, DAY_FIRST_OFFSET)
                        .ok()
                        .map(to_utc)
                }),
            Layout::Rfc1123ZoneName => parse_with_zone_name(strip_weekday(s)?, DAY_FIRST),
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(s).ok().map(to_utc),
            Layout::Rfc3339NoColon => DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z")
                .ok()
                .map(to_utc),
            Layout::SpacedOffset => DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f %z")
                .ok()
                .map(to_utc),
            Layout::SpacedNaive => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc()),
            Layout::DayFirstZoneName => parse_with_zone_name(s, DAY_FIRST),
        }
    }
}

/// Parse `raw` with the first matching known layout.
pub fn try_parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    LAYOUTS.iter().find_map(|layout| layout.parse(s))
}

/// Parse `raw`, substituting the current time when no layout matches.
///
/// A bad date never fails an item; it only costs accuracy in ordering.
pub fn parse_date(raw: &str) -> DateTime<Utc> {
    parse_date_or(raw, Utc::now())
}

/// Like [`parse_date`], with an explicit fallback time.
pub fn parse_date_or(raw: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    try_parse_date(raw).unwrap_or_else(|| {
        tracing::warn!("Could not parse date {:?}, using current time", raw);
        fallback
    })
}

fn to_utc(dt: DateTime<FixedOffset>) -> DateTime<Utc> {
    dt.with_timezone(&Utc)
}

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(s).ok().map(to_utc)
}

/// Drop a leading `Mon, ` so a wrong weekday can't sink an otherwise valid date.
fn strip_weekday(s: &str) -> Option<&str> {
    let (day, rest) = s.split_once(',')?;
    if day.len() >= 3 && day.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn parse_with_zone_name(s: &str, layout: &str) -> Option<DateTime<Utc>> {
    let (stamp, zone) = s.rsplit_once(' ')?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(stamp.trim_end(), layout).ok()?;
    let offset = FixedOffset::east_opt(zone_offset_hours(zone) * 3600)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Unknown abbreviations are taken as UTC.
fn zone_offset_hours(zone: &str) -> i32 {
    match zone.to_ascii_uppercase().as_str() {
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        _ => 0,
    }
}
