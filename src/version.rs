//! Version ordering helpers
//!
//! Version lists are ordered newest first:
//!
//! 1. Entries whose release dates both parse are ordered by date, newest first
//! 2. An entry with a parseable date precedes one without
//! 3. Otherwise version strings are compared segment by segment, highest first
//!
//! Dated entries with the same date fall back to the version comparison, and the sort is
//! stable, so fully equal entries keep their first-seen order.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::domain::Version;

/// Naive formats tried after the zoned ones, in order
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y"];

/// Parse a feed-provided date string
///
/// Accepts compact `YYYYMMDDHHMMSS` timestamps, RFC 3339, RFC 2822 and a handful of
/// common naive layouts (interpreted as UTC). Blank input yields `None`.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() == 14 && s.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S") {
            return Some(dt.and_utc());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// One dot/plus/dash separated piece of a version string
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    /// Decimal digits with leading zeros stripped
    Number(&'a str),
    Text(&'a str),
}

impl Segment<'_> {
    fn parse(raw: &str) -> Segment<'_> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Segment::Number("0");
        }
        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let digits = trimmed.trim_start_matches('0');
            return Segment::Number(if digits.is_empty() { "0" } else { digits });
        }
        Segment::Text(raw)
    }
}

impl Ord for Segment<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
            (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Segment<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn segments(version: &str) -> Vec<&str> {
    version.split(['.', '+', '-']).collect()
}

/// Compare two version strings, ascending
///
/// Numeric segments compare numerically, text segments lexically, a numeric segment beats a
/// text one, and a version that is a strict prefix of another sorts lower.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);

    for (x, y) in left.iter().zip(right.iter()) {
        let ordering = Segment::parse(x).cmp(&Segment::parse(y));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}

/// Order two version entries newest first, given their parsed dates
fn newest_first(
    (a_date, a): (Option<&DateTime<Utc>>, &Version),
    (b_date, b): (Option<&DateTime<Utc>>, &Version),
) -> Ordering {
    match (a_date, b_date) {
        (Some(x), Some(y)) => y
            .cmp(x)
            .then_with(|| compare_versions(&b.version, &a.version)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_versions(&b.version, &a.version),
    }
}

/// Sort versions newest first
pub fn sort_versions(versions: &mut Vec<Version>) {
    let mut dated: Vec<(Option<DateTime<Utc>>, Version)> = versions
        .drain(..)
        .map(|v| (v.release_date.as_deref().and_then(parse_date), v))
        .collect();

    dated.sort_by(|(a_date, a), (b_date, b)| {
        newest_first((a_date.as_ref(), a), (b_date.as_ref(), b))
    });

    versions.extend(dated.into_iter().map(|(_, v)| v));
}

/// Check that a version list is in the order `sort_versions` produces
pub fn is_sorted_newest_first(versions: &[Version]) -> bool {
    let dates: Vec<Option<DateTime<Utc>>> = versions
        .iter()
        .map(|v| v.release_date.as_deref().and_then(parse_date))
        .collect();

    versions.windows(2).zip(dates.windows(2)).all(|(pair, d)| {
        newest_first((d[0].as_ref(), &pair[0]), (d[1].as_ref(), &pair[1])) != Ordering::Greater
    })
}
