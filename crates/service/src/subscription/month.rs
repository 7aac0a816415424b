//! Month-granular dates in the fixed `MM-YYYY` text form.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::errors::ServiceError;

const FORMAT_HINT: &str = "invalid month format, expected MM-YYYY";

/// A calendar month, stored as its first day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Month)
    }

    /// Parse exactly `MM-YYYY`: two-digit month `01..=12`, dash, four-digit year.
    pub fn parse(text: &str) -> Result<Self, ServiceError> {
        let bytes = text.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[2] == b'-'
            && bytes[..2].iter().all(u8::is_ascii_digit)
            && bytes[3..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(ServiceError::invalid(format!("{FORMAT_HINT}: {text:?}")));
        }
        let month: u32 = text[..2]
            .parse()
            .map_err(|_| ServiceError::invalid(FORMAT_HINT))?;
        let year: i32 = text[3..]
            .parse()
            .map_err(|_| ServiceError::invalid(FORMAT_HINT))?;
        Month::new(year, month)
            .ok_or_else(|| ServiceError::invalid(format!("{FORMAT_HINT}: month out of range in {text:?}")))
    }

    /// Pin any date to the first day of its month.
    pub fn from_date(date: NaiveDate) -> Self {
        Month(date.with_day(1).unwrap_or(date))
    }

    pub fn year(&self) -> i32 { self.0.year() }

    pub fn month(&self) -> u32 { self.0.month() }

    /// First day of the month.
    pub fn date(&self) -> NaiveDate { self.0 }

    /// Next calendar month; `None` past chrono's upper date bound.
    pub fn succ(&self) -> Option<Self> {
        if self.month() == 12 {
            Month::new(self.year() + 1, 1)
        } else {
            Month::new(self.year(), self.month() + 1)
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:04}", self.month(), self.year())
    }
}

impl FromStr for Month {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::parse(s)
    }
}

/// Format an optional month; the unset value formats as an empty string.
pub fn format_month(month: Option<Month>) -> String {
    month.map(|m| m.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_yields_first_day_of_month() {
        let m = Month::parse("07-2025").unwrap();
        assert_eq!((m.year(), m.month()), (2025, 7));
        assert_eq!(m.date(), NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn format_inverts_parse() {
        for text in ["01-2025", "07-2025", "12-1999", "02-2024", "10-0001", "09-9999"] {
            assert_eq!(Month::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn format_inverts_parse_for_every_month_of_a_year() {
        for month in 1..=12 {
            let text = format!("{month:02}-2030");
            assert_eq!(format_month(Some(Month::parse(&text).unwrap())), text);
        }
    }

    #[test]
    fn rejects_malformed_inputs() {
        for text in ["13-2025", "2025-07", "7-2025", "", "00-2025", "99-2025", "01-07-2025", "07/2025", "07-25", "+7-2025", "07-2025 "] {
            let err = Month::parse(text).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidArgument(_)), "{text:?} should be rejected");
        }
    }

    #[test]
    fn unset_month_formats_as_empty() {
        assert_eq!(format_month(None), "");
    }

    #[test]
    fn succ_rolls_over_year_boundary() {
        let dec = Month::new(2024, 12).unwrap();
        assert_eq!(dec.succ(), Month::new(2025, 1));
        let jan = Month::new(2025, 1).unwrap();
        assert_eq!(jan.succ(), Month::new(2025, 2));
    }

    #[test]
    fn from_date_pins_day_to_first() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert_eq!(Month::from_date(d), Month::new(2025, 3).unwrap());
    }

    #[test]
    fn ordering_follows_calendar() {
        assert!(Month::parse("12-2024").unwrap() < Month::parse("01-2025").unwrap());
        assert!(Month::parse("07-2025").unwrap() < Month::parse("12-2025").unwrap());
    }
}
