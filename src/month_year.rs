//! Month-granularity calendar dates.
//!
//! Requests carry dates as `MM-YYYY`. Storage keeps them as `YYYY-MM-01` so that
//! plain text comparison in SQL orders them chronologically.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use time::{Date, Month};

use crate::error::SubscriptionError;

/// A calendar month; the day is always the first of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthYear(Date);

impl MonthYear {
    pub fn new(year: i32, month: u8) -> Result<Self, SubscriptionError> {
        let month = Month::try_from(month)
            .map_err(|_| SubscriptionError::validation(format!("invalid month: {month}")))?;
        Date::from_calendar_date(year, month, 1)
            .map(Self)
            .map_err(|e| SubscriptionError::validation(format!("invalid date: {e}")))
    }

    /// Parses the strict `MM-YYYY` wire format. Two-digit month, four-digit year.
    pub fn parse(input: &str) -> Result<Self, SubscriptionError> {
        let invalid = || {
            SubscriptionError::validation(format!(
                "invalid date {input:?}: expected {}",
                crate::constants::MONTH_YEAR_FORMAT
            ))
        };

        let (month, year) = input.split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 || year.len() != 4 {
            return Err(invalid());
        }
        if !month.bytes().chain(year.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let month: u8 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// Reads the `YYYY-MM-01` storage representation.
    pub fn from_storage(value: &str) -> Option<Self> {
        let mut parts = value.splitn(3, '-');
        let year = parts.next()?.parse::<i32>().ok()?;
        let month = parts.next()?.parse::<u8>().ok()?;
        parts.next()?;
        Self::new(year, month).ok()
    }

    pub fn to_storage(self) -> String {
        format!("{:04}-{:02}-01", self.year(), self.month())
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u8 {
        u8::from(self.0.month())
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl Serialize for MonthYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_month_year() {
        let date = MonthYear::parse("07-2025").unwrap();
        assert_eq!(date.month(), 7);
        assert_eq!(date.year(), 2025);
        assert_eq!(date.to_string(), "07-2025");
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(MonthYear::parse("13-2024").unwrap_err().is_validation());
        assert!(MonthYear::parse("00-2024").unwrap_err().is_validation());
    }

    #[test]
    fn rejects_loose_formats() {
        for input in ["7-2025", "07-25", "2025-07", "07/2025", "", "07-2025-01", "+7-2025", "ab-cdef"] {
            assert!(
                MonthYear::parse(input).is_err(),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn storage_representation_orders_chronologically() {
        let earlier = MonthYear::parse("12-2023").unwrap();
        let later = MonthYear::parse("01-2024").unwrap();
        assert_eq!(earlier.to_storage(), "2023-12-01");
        assert!(earlier.to_storage() < later.to_storage());
        assert!(earlier < later);
        assert_eq!(MonthYear::from_storage("2024-01-01"), Some(later));
    }

    #[test]
    fn from_storage_rejects_garbage() {
        assert_eq!(MonthYear::from_storage("not a date"), None);
        assert_eq!(MonthYear::from_storage("2024-13-01"), None);
    }

    #[test]
    fn serde_uses_wire_format() {
        let date = MonthYear::parse("03-2026").unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"03-2026\"");
        let back: MonthYear = serde_json::from_str("\"03-2026\"").unwrap();
        assert_eq!(back, date);
        assert!(serde_json::from_str::<MonthYear>("\"2026-03\"").is_err());
    }
}
