//! Calendar-date key in the backend's wire format.

use core::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire format used by the backend for date-keyed data: zero-padded
/// `MM/DD/YYYY`.
const WIRE_FORMAT: &str = "%m/%d/%Y";

/// Errors that can occur when parsing a [`DateKey`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum DateKeyError {
    /// The input is not a valid `MM/DD/YYYY` date.
    #[error("invalid date key {input:?}: expected MM/DD/YYYY")]
    Invalid {
        /// The rejected input.
        input: String,
    },
}

/// A calendar date keyed the way the backend keys it.
///
/// The auction backend addresses days as zero-padded `MM/DD/YYYY` strings:
/// the sparse per-day count mapping is keyed by this form, and
/// `/auctions-by-date` takes it as its `date` parameter. `DateKey` wraps a
/// [`NaiveDate`] and pins `Display`, `FromStr`, and serde to that wire form
/// so the format lives in exactly one place.
///
/// ## Examples
///
/// ```
/// use gavelpoint_core::DateKey;
///
/// let key: DateKey = "02/05/2024".parse().unwrap();
/// assert_eq!(key.to_string(), "02/05/2024");
/// assert_eq!(key.date().to_string(), "2024-02-05");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Create a `DateKey` from a calendar date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Create a `DateKey` from year, month, and day.
    ///
    /// Returns `None` for out-of-range components (e.g. February 30).
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The underlying calendar date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.0
    }

    /// Year component.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month component (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day-of-month component (1-31).
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl std::str::FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, WIRE_FORMAT)
            .map(Self)
            .map_err(|_| DateKeyError::Invalid {
                input: s.to_owned(),
            })
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zero_pads() {
        let key = DateKey::from_ymd(2024, 2, 5).unwrap();
        assert_eq!(key.to_string(), "02/05/2024");
    }

    #[test]
    fn test_parse_roundtrip() {
        let key: DateKey = "12/31/2023".parse().unwrap();
        assert_eq!(key.year(), 2023);
        assert_eq!(key.month(), 12);
        assert_eq!(key.day(), 31);
        assert_eq!(key.to_string(), "12/31/2023");
    }

    #[test]
    fn test_parse_rejects_iso_dates() {
        assert!("2024-02-05".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_parse_rejects_impossible_dates() {
        assert!("02/30/2024".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_form() {
        let key = DateKey::from_ymd(2024, 8, 9).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"08/09/2024\"");
        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let early: DateKey = "01/02/2024".parse().unwrap();
        let late: DateKey = "11/01/2024".parse().unwrap();
        // String ordering would put 11/01 before 01/02; calendar ordering must not.
        assert!(early < late);
    }
}
