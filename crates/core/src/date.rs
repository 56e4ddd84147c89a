//! Date ranges for collection filtering.
//!
//! The service filters collections by calendar date. Both bounds are
//! inclusive, so `2019-02-01..2019-02-28` is a 28-day window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse from two ISO 8601 date strings (e.g. `"2019-02-01"`).
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
            .map_err(|_| Error::DateParse(start.to_string()))?;
        let end = NaiveDate::parse_from_str(end, "%Y-%m-%d")
            .map_err(|_| Error::DateParse(end.to_string()))?;
        Self::new(start, end)
    }

    /// Number of days covered, counting both bounds.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether two ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_length() {
        let r = DateRange::parse("2019-02-01", "2019-02-28").unwrap();
        assert_eq!(r.days(), 28);
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(DateRange::parse("2020-02-28", "2020-02-01").is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(DateRange::parse("not-a-date", "2020-02-01").is_err());
    }

    #[test]
    fn overlap() {
        let a = DateRange::parse("2019-02-01", "2019-02-28").unwrap();
        let b = DateRange::parse("2020-02-01", "2020-02-28").unwrap();
        let c = DateRange::parse("2019-02-15", "2019-03-15").unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn contains_bounds() {
        let r = DateRange::parse("2014-07-01", "2014-07-30").unwrap();
        assert!(r.contains(NaiveDate::from_ymd_opt(2014, 7, 1).unwrap()));
        assert!(r.contains(NaiveDate::from_ymd_opt(2014, 7, 30).unwrap()));
        assert!(!r.contains(NaiveDate::from_ymd_opt(2014, 7, 31).unwrap()));
    }

    #[test]
    fn serializes_as_iso_dates() {
        let r = DateRange::parse("2011-01-01", "2020-01-31").unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["start"], "2011-01-01");
        assert_eq!(json["end"], "2020-01-31");
    }
}
