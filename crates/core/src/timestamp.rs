//! Acquisition timestamps and time ranges.
//!
//! Timestamps are stored as fixed-width `YYYY-MM-DDTHH:MM:SS` UTC strings so
//! that lexicographic comparison in SQL matches chronological order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// A UTC instant with second precision.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(PrimitiveDateTime);

impl Timestamp {
    /// Parse an ISO-8601 style timestamp.
    ///
    /// Accepted forms:
    /// - RFC 3339 with offset (`2024-01-15T10:15:00+02:00`), converted to UTC
    /// - naive `2024-01-15T10:15:00` or `2024-01-15 10:15:00`, optionally with
    ///   fractional seconds, taken as UTC
    /// - compact `20240115T101500` as embedded in product file names
    /// - date only `2024-01-15` (midnight)
    ///
    /// Sub-second precision is truncated.
    pub fn parse(value: &str) -> crate::Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(crate::Error::InvalidTimestamp(
                "timestamp cannot be empty".to_string(),
            ));
        }
        if let Ok(datetime) = OffsetDateTime::parse(value, &Rfc3339) {
            return Self::from_datetime(datetime);
        }
        let parsed = parse_naive(value).ok_or_else(|| {
            crate::Error::InvalidTimestamp(format!("unrecognised timestamp '{value}'"))
        })?;
        Self::from_primitive(parsed)
    }

    /// Create from an offset-aware datetime, converting to UTC.
    pub fn from_datetime(datetime: OffsetDateTime) -> crate::Result<Self> {
        let utc = datetime.checked_to_offset(UtcOffset::UTC).ok_or_else(|| {
            crate::Error::InvalidTimestamp(format!("{datetime} is out of range in UTC"))
        })?;
        Self::from_primitive(PrimitiveDateTime::new(utc.date(), utc.time()))
    }

    fn from_primitive(datetime: PrimitiveDateTime) -> crate::Result<Self> {
        if datetime.year() < 1 {
            return Err(crate::Error::InvalidTimestamp(format!(
                "year {} is out of range",
                datetime.year()
            )));
        }
        let datetime = datetime
            .replace_nanosecond(0)
            .map_err(|e| crate::Error::InvalidTimestamp(e.to_string()))?;
        Ok(Self(datetime))
    }

    /// The instant as a UTC datetime.
    pub fn as_datetime(&self) -> OffsetDateTime {
        self.0.assume_utc()
    }
}

fn parse_naive(value: &str) -> Option<PrimitiveDateTime> {
    let naive = [
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
        ),
        format_description!("[year][month][day]T[hour][minute][second]"),
    ];
    for format in naive {
        if let Ok(datetime) = PrimitiveDateTime::parse(value, format) {
            return Some(datetime);
        }
    }

    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(Date::midnight)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        let text = self.0.format(format).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({self})")
    }
}

impl FromStr for Timestamp {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(&value)
    }
}

impl From<Timestamp> for String {
    fn from(value: Timestamp) -> Self {
        value.to_string()
    }
}

/// A closed time interval `[start, end]` with `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeRange {
    start: Timestamp,
    end: Timestamp,
}

impl TimeRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: Timestamp, end: Timestamp) -> crate::Result<Self> {
        if start > end {
            return Err(crate::Error::InvalidRange(format!(
                "start ({start}) is after end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both bounds and build the range.
    pub fn parse(start: &str, end: &str) -> crate::Result<Self> {
        Self::new(Timestamp::parse(start)?, Timestamp::parse(end)?)
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> Timestamp {
        Timestamp::parse(value).unwrap()
    }

    #[test]
    fn test_parse_naive_is_canonical() {
        assert_eq!(ts("2024-01-15T10:15:00").to_string(), "2024-01-15T10:15:00");
        assert_eq!(ts("2024-01-15 10:15:00").to_string(), "2024-01-15T10:15:00");
        assert_eq!(
            ts("2024-01-15T10:15:00.987654").to_string(),
            "2024-01-15T10:15:00"
        );
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        assert_eq!(
            ts("2024-01-15T10:15:00+02:00").to_string(),
            "2024-01-15T08:15:00"
        );
        assert_eq!(ts("2024-01-15T10:15:00Z").to_string(), "2024-01-15T10:15:00");
    }

    #[test]
    fn test_parse_compact_filename_form() {
        assert_eq!(ts("20240115T101500").to_string(), "2024-01-15T10:15:00");
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(ts("2024-01-15").to_string(), "2024-01-15T00:00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Timestamp::parse(""),
            Err(crate::Error::InvalidTimestamp(_))
        ));
        assert!(matches!(
            Timestamp::parse("yesterday"),
            Err(crate::Error::InvalidTimestamp(_))
        ));
        assert!(Timestamp::parse("2024-13-01T00:00:00").is_err());
    }

    #[test]
    fn test_offset_outside_utc_range_is_rejected() {
        // Valid RFC 3339, but the UTC instant falls in year 10000
        assert!(matches!(
            Timestamp::parse("9999-12-31T23:30:00-01:00"),
            Err(crate::Error::InvalidTimestamp(_))
        ));
        assert!(matches!(
            Timestamp::parse("0001-01-01T00:30:00+01:00"),
            Err(crate::Error::InvalidTimestamp(_))
        ));
        assert!(serde_json::from_str::<Timestamp>("\"9999-12-31T23:30:00-01:00\"").is_err());
        assert_eq!(
            ts("9999-12-31T22:30:00-01:00").to_string(),
            "9999-12-31T23:30:00"
        );
    }

    #[test]
    fn test_ordering_matches_string_ordering() {
        let a = ts("2023-12-31T23:59:59");
        let b = ts("2024-01-01T00:00:00");
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn test_serde_as_string() {
        let value = ts("2024-01-15T10:15:00+01:00");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"2024-01-15T09:15:00\"");
        let decoded: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, value);
        assert!(serde_json::from_str::<Timestamp>("\"not a time\"").is_err());
    }

    #[test]
    fn test_time_range_validation() {
        let range = TimeRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.start().to_string(), "2024-01-01T00:00:00");

        // Single instant is a valid range
        assert!(TimeRange::parse("2024-01-01", "2024-01-01").is_ok());

        let err = TimeRange::parse("2024-02-01", "2024-01-01").unwrap_err();
        assert!(matches!(err, crate::Error::InvalidRange(_)));
    }
}
