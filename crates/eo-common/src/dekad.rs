//! Dekad handling for periodic satellite composites.
//!
//! A dekad is a ten-day (or month-remainder) period; every calendar month
//! has exactly three. The first two cover days 1-10 and 11-20, the third
//! runs from day 21 to the true end of the month (8-11 days depending on
//! month and leap year). The three dekads of a month tile it exactly,
//! with no gaps or overlaps.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EoError, EoResult};

/// Position of a dekad within its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DekadLabel {
    D1,
    D2,
    D3,
}

impl FromStr for DekadLabel {
    type Err = EoError;

    fn from_str(s: &str) -> EoResult<Self> {
        match s {
            "D1" => Ok(DekadLabel::D1),
            "D2" => Ok(DekadLabel::D2),
            "D3" => Ok(DekadLabel::D3),
            other => Err(EoError::Validation(format!(
                "Unrecognized dekad label: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for DekadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DekadLabel::D1 => write!(f, "D1"),
            DekadLabel::D2 => write!(f, "D2"),
            DekadLabel::D3 => write!(f, "D3"),
        }
    }
}

/// One dekad of a specific calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dekad {
    pub year: i32,
    pub month: u32,
    pub label: DekadLabel,
}

/// Representative instant and closed time range derived from a [`Dekad`].
///
/// Immutable once computed; callers recompute fresh per input rather than
/// mutating an existing resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DekadResolution {
    /// End-of-dekad date at 23:59:59, used as the searchable datetime.
    pub datetime: NaiveDateTime,
    /// Start of the dekad at 00:00:00.
    pub start: NaiveDateTime,
    /// Equal to `datetime`; the range is closed on both ends.
    pub end: NaiveDateTime,
}

/// Years accepted in dekad strings. Four digits, well inside chrono's
/// representable range, so date construction in `resolve()` cannot fail.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

impl Dekad {
    pub fn new(year: i32, month: u32, label: DekadLabel) -> EoResult<Self> {
        if !YEAR_RANGE.contains(&year) {
            return Err(EoError::Validation(format!("Year out of range: {}", year)));
        }
        if !(1..=12).contains(&month) {
            return Err(EoError::Validation(format!(
                "Month out of range: {}",
                month
            )));
        }
        Ok(Self { year, month, label })
    }

    /// Parse the compact `YYYY-MM-Dk` form used in WaPOR raster names,
    /// e.g. `2023-01-D1`. String year/month are coerced here.
    pub fn from_compact_str(s: &str) -> EoResult<Self> {
        let mut parts = s.splitn(3, '-');
        let (year, month, label) = match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(l)) => (y, m, l),
            _ => {
                return Err(EoError::Validation(format!(
                    "Malformed dekad string: {}",
                    s
                )))
            }
        };

        let year: i32 = year
            .parse()
            .map_err(|_| EoError::Validation(format!("Invalid year in dekad string: {}", s)))?;
        let month: u32 = month
            .parse()
            .map_err(|_| EoError::Validation(format!("Invalid month in dekad string: {}", s)))?;

        Dekad::new(year, month, label.parse()?)
    }

    /// Resolve the dekad to its representative instant and time range.
    ///
    /// Boundaries fall on days 1, 11 and 21 regardless of month length;
    /// D3 ends on the actual last day of the month.
    pub fn resolve(&self) -> DekadResolution {
        let (start_day, end_day) = match self.label {
            DekadLabel::D1 => (1, 10),
            DekadLabel::D2 => (11, 20),
            DekadLabel::D3 => (21, last_day_of_month(self.year, self.month)),
        };

        // Year, month and days are all in range by construction (new()
        // validated year and month).
        let start_date = NaiveDate::from_ymd_opt(self.year, self.month, start_day)
            .expect("valid dekad start day");
        let end_date =
            NaiveDate::from_ymd_opt(self.year, self.month, end_day).expect("valid dekad end day");

        let start = start_date.and_hms_opt(0, 0, 0).expect("midnight");
        let end = end_date.and_hms_opt(23, 59, 59).expect("end of day");

        DekadResolution {
            datetime: end,
            start,
            end,
        }
    }
}

impl fmt::Display for Dekad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{}", self.year, self.month, self.label)
    }
}

/// Last calendar day of a month, leap-year aware.
fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("valid first of month")
        .pred_opt()
        .expect("valid last of month")
        .day()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2021, 2), 28);
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2023, 4), 30);
        assert_eq!(last_day_of_month(2023, 12), 31);
    }

    #[test]
    fn test_label_parse() {
        assert_eq!("D1".parse::<DekadLabel>().unwrap(), DekadLabel::D1);
        assert!(matches!(
            "D4".parse::<DekadLabel>(),
            Err(EoError::Validation(_))
        ));
        assert!(matches!(
            "d1".parse::<DekadLabel>(),
            Err(EoError::Validation(_))
        ));
    }

    #[test]
    fn test_compact_parse() {
        let dekad = Dekad::from_compact_str("2023-01-D1").unwrap();
        assert_eq!(dekad.year, 2023);
        assert_eq!(dekad.month, 1);
        assert_eq!(dekad.label, DekadLabel::D1);

        assert!(Dekad::from_compact_str("2023-01").is_err());
        assert!(Dekad::from_compact_str("2023-13-D1").is_err());
        assert!(Dekad::from_compact_str("soil-moisture-D1").is_err());
    }

    #[test]
    fn test_year_out_of_range_is_validation_error() {
        // Raster names come from external catalogs; an absurd year must
        // surface as a Validation error, never reach resolve().
        assert!(matches!(
            Dekad::from_compact_str("999999-01-D1"),
            Err(EoError::Validation(_))
        ));
        assert!(matches!(
            Dekad::new(999_999, 1, DekadLabel::D1),
            Err(EoError::Validation(_))
        ));
        assert!(matches!(
            Dekad::new(-1, 1, DekadLabel::D1),
            Err(EoError::Validation(_))
        ));
        assert!(Dekad::new(1000, 1, DekadLabel::D1).is_ok());
        // The upper boundary still resolves (D3 needs the first of the
        // following year to find the month's last day).
        let top = Dekad::new(9999, 12, DekadLabel::D3).unwrap().resolve();
        assert_eq!(top.end.date().day(), 31);
    }
}
