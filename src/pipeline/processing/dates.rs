//! Date normalization shared by status reconciliation and the catalog listing.
//!
//! Scraped air dates are free text. [`DateNormalizer::normalize`] turns them
//! into a [`NormalizedInstant`] in two attempts: a direct calendar parse of the
//! whole string, then a scan for a `Month D[, YYYY]` fragment. Anything else is
//! [`NormalizedInstant::Unknown`], which is an ordinary value rather than an
//! error.

use crate::common::constants::DATE_PLACEHOLDER;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z]+)\s+(\d{1,2}),?\s*(\d{4})?").expect("month/day/year pattern is valid")
});

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

// %B also accepts the three-letter abbreviation when parsing.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%A, %B %d, %Y",
    "%A %B %d, %Y",
    "%d %B %Y",
    "%d %B, %Y",
];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A parsed air date, or the explicit absence of one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizedInstant {
    Known(NaiveDateTime),
    Unknown,
}

impl NormalizedInstant {
    pub fn is_known(&self) -> bool {
        matches!(self, NormalizedInstant::Known(_))
    }

    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            NormalizedInstant::Known(at) => Some(*at),
            NormalizedInstant::Unknown => None,
        }
    }

    /// True only for a known instant strictly earlier than `reference`
    pub fn is_before(&self, reference: NaiveDateTime) -> bool {
        matches!(self, NormalizedInstant::Known(at) if *at < reference)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Parses air-date text relative to a fixed "today".
///
/// `today` only matters for fragments without a year, which are placed in
/// today's calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    today: NaiveDate,
}

impl DateNormalizer {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Normalizer anchored on the UTC calendar date of `instant`
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self::new(instant.date_naive())
    }

    pub fn for_current_date() -> Self {
        Self::at(Utc::now())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn normalize(&self, text: &str) -> NormalizedInstant {
        let trimmed = text.trim();
        if is_placeholder(trimmed) {
            return NormalizedInstant::Unknown;
        }

        parse_direct(trimmed)
            .or_else(|| self.parse_month_day(trimmed))
            .map_or(NormalizedInstant::Unknown, NormalizedInstant::Known)
    }

    /// Human-readable form used by the listing, e.g. `Jan 28, 2026`.
    ///
    /// Blank input renders as the placeholder dash; text that cannot be parsed
    /// is shown as-is.
    pub fn display(&self, text: &str) -> String {
        let trimmed = text.trim();
        if is_placeholder(trimmed) {
            return DATE_PLACEHOLDER.to_string();
        }
        match self.normalize(trimmed) {
            NormalizedInstant::Known(at) => at.format("%b %-d, %Y").to_string(),
            NormalizedInstant::Unknown => trimmed.to_string(),
        }
    }

    /// Chronological ordering of two air-date strings.
    ///
    /// Unknown dates come after every known date whichever the direction.
    pub fn compare(&self, a: &str, b: &str, direction: SortDirection) -> Ordering {
        match (self.normalize(a), self.normalize(b)) {
            (NormalizedInstant::Known(x), NormalizedInstant::Known(y)) => match direction {
                SortDirection::Ascending => x.cmp(&y),
                SortDirection::Descending => y.cmp(&x),
            },
            (NormalizedInstant::Known(_), NormalizedInstant::Unknown) => Ordering::Less,
            (NormalizedInstant::Unknown, NormalizedInstant::Known(_)) => Ordering::Greater,
            (NormalizedInstant::Unknown, NormalizedInstant::Unknown) => Ordering::Equal,
        }
    }

    fn parse_month_day(&self, text: &str) -> Option<NaiveDateTime> {
        MONTH_DAY_YEAR.captures_iter(text).find_map(|caps| {
            let month = month_from_name(caps.get(1)?.as_str())?;
            let day: u32 = caps.get(2)?.as_str().parse().ok()?;
            let year = match caps.get(3) {
                Some(year) => year.as_str().parse().ok()?,
                None => self.today.year(),
            };
            NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
        })
    }
}

fn is_placeholder(trimmed: &str) -> bool {
    matches!(trimmed, "" | "—" | "–" | "-")
}

fn parse_direct(text: &str) -> Option<NaiveDateTime> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.naive_utc());
    }
    if let Ok(at) = DateTime::parse_from_rfc2822(text) {
        return Some(at.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(at) = NaiveDateTime::parse_from_str(text, format) {
            return Some(at);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Month number for a full name, a prefix of at least three letters, or `Sept`
fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    if lower == "sept" {
        return Some(9);
    }
    if lower.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|month| month.starts_with(lower.as_str()))
        .map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> DateNormalizer {
        DateNormalizer::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    fn midnight(year: i32, month: u32, day: u32) -> NormalizedInstant {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        NormalizedInstant::Known(date.and_hms_opt(0, 0, 0).unwrap())
    }

    #[test]
    fn test_equivalent_shapes_normalize_to_same_instant() {
        let n = normalizer();
        let expected = midnight(2026, 1, 28);
        assert_eq!(n.normalize("January 28, 2026"), expected);
        assert_eq!(n.normalize("2026-01-28"), expected);
        assert_eq!(n.normalize("Jan 28 2026"), expected);
        assert_eq!(n.normalize("Jan 28, 2026"), expected);
        assert_eq!(n.normalize("  01/28/2026 "), expected);
        assert_eq!(n.normalize("Wednesday, January 28, 2026"), expected);
        assert_eq!(n.normalize("28 January 2026"), expected);
    }

    #[test]
    fn test_blank_and_garbage_are_unknown() {
        let n = normalizer();
        assert_eq!(n.normalize(""), NormalizedInstant::Unknown);
        assert_eq!(n.normalize("   "), NormalizedInstant::Unknown);
        assert_eq!(n.normalize("—"), NormalizedInstant::Unknown);
        assert_eq!(n.normalize("not a date"), NormalizedInstant::Unknown);
        assert_eq!(n.normalize("Episode 12"), NormalizedInstant::Unknown);
    }

    #[test]
    fn test_timestamps_keep_time_of_day() {
        let n = normalizer();
        let at = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap().and_hms_opt(17, 30, 0).unwrap();
        assert_eq!(n.normalize("2026-02-10T17:30:00"), NormalizedInstant::Known(at));
        assert_eq!(n.normalize("2026-02-10T17:30:00Z"), NormalizedInstant::Known(at));
        assert_eq!(n.normalize("2026-02-10T12:30:00-05:00"), NormalizedInstant::Known(at));
    }

    #[test]
    fn test_fallback_finds_fragment_inside_text() {
        let n = normalizer();
        assert_eq!(n.normalize("Aired on January 28, 2026"), midnight(2026, 1, 28));
        assert_eq!(n.normalize("Coming up Sept 9, 2025 at noon"), midnight(2025, 9, 9));
        assert_eq!(n.normalize("Session 3 of March 4, 2025"), midnight(2025, 3, 4));
    }

    #[test]
    fn test_missing_year_uses_current_year() {
        let n = normalizer();
        assert_eq!(n.normalize("March 3"), midnight(2026, 3, 3));

        let other_year = DateNormalizer::new(NaiveDate::from_ymd_opt(2031, 1, 1).unwrap());
        assert_eq!(other_year.normalize("Dec 24"), midnight(2031, 12, 24));
    }

    #[test]
    fn test_impossible_calendar_day_is_unknown() {
        let n = normalizer();
        assert_eq!(n.normalize("February 30, 2026"), NormalizedInstant::Unknown);
    }

    #[test]
    fn test_is_before_is_strict() {
        let reference = NaiveDate::from_ymd_opt(2026, 1, 28).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(midnight(2026, 1, 27).is_before(reference));
        assert!(!midnight(2026, 1, 28).is_before(reference));
        assert!(!NormalizedInstant::Unknown.is_before(reference));
    }

    #[test]
    fn test_display_formats() {
        let n = normalizer();
        assert_eq!(n.display("2026-01-28"), "Jan 28, 2026");
        assert_eq!(n.display("March 3"), "Mar 3, 2026");
        assert_eq!(n.display(""), "—");
        assert_eq!(n.display("—"), "—");
        assert_eq!(n.display(" TBD "), "TBD");
    }

    #[test]
    fn test_compare_puts_unknown_last_in_both_directions() {
        let n = normalizer();
        let mut dates = vec!["", "2026-03-01", "not a date", "January 5, 2026"];

        dates.sort_by(|a, b| n.compare(a, b, SortDirection::Ascending));
        assert_eq!(&dates[..2], &["January 5, 2026", "2026-03-01"]);

        dates.sort_by(|a, b| n.compare(a, b, SortDirection::Descending));
        assert_eq!(&dates[..2], &["2026-03-01", "January 5, 2026"]);
        assert!(!n.normalize(dates[2]).is_known());
        assert!(!n.normalize(dates[3]).is_known());
    }

    #[test]
    fn test_month_from_name() {
        assert_eq!(month_from_name("Jan"), Some(1));
        assert_eq!(month_from_name("SEPT"), Some(9));
        assert_eq!(month_from_name("december"), Some(12));
        assert_eq!(month_from_name("Ma"), None);
        assert_eq!(month_from_name("Aired"), None);
    }
}
