use chrono::{Duration as ChronoDur, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::{
    borrow::Cow,
    fmt::{self, Display},
};

use crate::CellErrorKind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ───────────────────── Excel date-serial utilities ───────────────────
Excel's 1900 serial date system:
  Serial 1  = 1900-01-01
  Serial 59 = 1900-02-28
  Serial 60 = 1900-02-29  (phantom – doesn't exist, but Excel thinks it does)
  Serial 61 = 1900-03-01
Base date = 1899-12-31 so that serial 1 = base + 1 day = 1900-01-01.

The 1904 system (legacy Mac workbooks) has no phantom day:
  Serial 0  = 1904-01-01
Time is stored as fractional days (no timezone).
------------------------------------------------------------------- */

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar constant"),
    }
}

/// Base date for the 1900 date system. Serial 1 = base + 1 day = 1900-01-01.
const EXCEL_EPOCH: NaiveDate = ymd(1899, 12, 31);
const EXCEL_1904_EPOCH: NaiveDate = ymd(1904, 1, 1);
const PHANTOM_LEAP_CUTOFF: NaiveDate = ymd(1900, 3, 1);
const PHANTOM_LEAP_FALLBACK: NaiveDate = ymd(1900, 2, 28);

/// Largest serial Excel accepts in the 1900 system (9999-12-31).
pub const MAX_SERIAL_1900: f64 = 2_958_465.0;

const SECS_PER_DAY: i64 = 86_400;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateSystem {
    #[default]
    Excel1900,
    Excel1904,
}

impl DateSystem {
    /// Convert a serial number into a calendar timestamp.
    ///
    /// Returns `None` for NaN, negative serials, and serials beyond 9999-12-31.
    pub fn serial_to_datetime(self, serial: f64) -> Option<NaiveDateTime> {
        if !serial.is_finite() || serial < 0.0 {
            return None;
        }
        let limit = match self {
            DateSystem::Excel1900 => MAX_SERIAL_1900,
            DateSystem::Excel1904 => MAX_SERIAL_1900 - 1462.0,
        };
        if serial >= limit + 1.0 {
            return None;
        }

        let total_secs = (serial * SECS_PER_DAY as f64).round() as i64;
        let days = total_secs.div_euclid(SECS_PER_DAY);
        let secs = total_secs.rem_euclid(SECS_PER_DAY) as u32;

        let date = match self {
            // Serial 60 is phantom 1900-02-29; map to 1900-02-28
            DateSystem::Excel1900 if days == 60 => PHANTOM_LEAP_FALLBACK,
            DateSystem::Excel1900 => {
                // serial < 60: offset = serial (no phantom day yet)
                // serial > 60: offset = serial - 1 (skip phantom day)
                let offset = if days < 60 { days } else { days - 1 };
                EXCEL_EPOCH + ChronoDur::days(offset)
            }
            DateSystem::Excel1904 => EXCEL_1904_EPOCH + ChronoDur::days(days),
        };

        let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)?;
        Some(date.and_time(time))
    }

    /// Convert a calendar timestamp into a serial number.
    pub fn datetime_to_serial(self, dt: &NaiveDateTime) -> f64 {
        let serial_days = match self {
            DateSystem::Excel1900 => {
                let days = (dt.date() - EXCEL_EPOCH).num_days();
                // Dates on or after 1900-03-01 get +1 to account for phantom Feb 29
                if dt.date() >= PHANTOM_LEAP_CUTOFF {
                    days + 1
                } else {
                    days
                }
            }
            DateSystem::Excel1904 => (dt.date() - EXCEL_1904_EPOCH).num_days(),
        };

        let secs_in_day = dt.time().num_seconds_from_midnight() as f64;
        serial_days as f64 + secs_in_day / SECS_PER_DAY as f64
    }
}

/// 1900-system shorthand for [`DateSystem::datetime_to_serial`].
pub fn datetime_to_serial(dt: &NaiveDateTime) -> f64 {
    DateSystem::Excel1900.datetime_to_serial(dt)
}

/// An untyped value as read from a single worksheet cell.
///
/// Mirrors what spreadsheet hosts hand out; the row mapper coerces these into
/// typed record fields.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Error(CellErrorKind),
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::DateTime(dt) => write!(f, "{dt}"),
            CellValue::Time(t) => write!(f, "{t}"),
            CellValue::Error(e) => write!(f, "{e}"),
        }
    }
}

impl CellValue {
    /// True for a blank cell. Empty text is *not* blank; hosts distinguish the two.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Short tag for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Text(_) => "text",
            CellValue::Int(_) => "int",
            CellValue::Number(_) => "number",
            CellValue::Boolean(_) => "boolean",
            CellValue::Date(_) => "date",
            CellValue::DateTime(_) => "datetime",
            CellValue::Time(_) => "time",
            CellValue::Error(_) => "error",
        }
    }

    /// Borrow text cells, render everything else.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Empty => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Numeric view of the cell: numbers as-is, booleans as 0/1, temporal
    /// values as 1900-system serials. Text is never parsed here.
    pub fn as_serial_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Date(d) => Some(datetime_to_serial(&d.and_time(NaiveTime::MIN))),
            CellValue::DateTime(dt) => Some(datetime_to_serial(dt)),
            CellValue::Time(t) => {
                Some(t.num_seconds_from_midnight() as f64 / SECS_PER_DAY as f64)
            }
            CellValue::Empty | CellValue::Text(_) | CellValue::Error(_) => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value as i64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl From<CellErrorKind> for CellValue {
    fn from(value: CellErrorKind) -> Self {
        CellValue::Error(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
        DateSystem::Excel1900.serial_to_datetime(serial)
    }

    #[test]
    fn serial_1900_matches_excel_anchors() {
        let sys = DateSystem::Excel1900;
        assert_eq!(sys.serial_to_datetime(1.0).unwrap().date(), date(1900, 1, 1));
        assert_eq!(sys.serial_to_datetime(59.0).unwrap().date(), date(1900, 2, 28));
        assert_eq!(sys.serial_to_datetime(60.0).unwrap().date(), date(1900, 2, 28));
        assert_eq!(sys.serial_to_datetime(61.0).unwrap().date(), date(1900, 3, 1));
        assert_eq!(
            sys.serial_to_datetime(44986.0).unwrap().date(),
            date(2023, 3, 1)
        );
    }

    #[test]
    fn serial_fraction_becomes_time_of_day() {
        let dt = serial_to_datetime(45306.5).unwrap();
        assert_eq!(dt.date(), date(2024, 1, 15));
        assert_eq!(dt.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn serial_rounding_rolls_into_next_day() {
        // 0.9999999 of a day rounds to midnight of the following day.
        let dt = serial_to_datetime(45306.999_999_9).unwrap();
        assert_eq!(dt.date(), date(2024, 1, 16));
        assert_eq!(dt.time(), NaiveTime::MIN);
    }

    #[test]
    fn serial_1904_has_no_phantom_day() {
        let sys = DateSystem::Excel1904;
        assert_eq!(sys.serial_to_datetime(0.0).unwrap().date(), date(1904, 1, 1));
        let dt = date(2023, 3, 1).and_time(NaiveTime::MIN);
        assert_eq!(sys.datetime_to_serial(&dt), 44986.0 - 1462.0);
    }

    #[test]
    fn serial_rejects_out_of_range() {
        assert!(serial_to_datetime(-1.0).is_none());
        assert!(serial_to_datetime(f64::NAN).is_none());
        assert!(serial_to_datetime(MAX_SERIAL_1900 + 1.0).is_none());
        assert!(serial_to_datetime(MAX_SERIAL_1900).is_some());
    }

    #[test]
    fn datetime_serial_roundtrip() {
        let dt = date(2024, 7, 4).and_hms_opt(18, 30, 0).unwrap();
        let serial = datetime_to_serial(&dt);
        assert_eq!(serial_to_datetime(serial), Some(dt));
    }

    #[test]
    fn text_rendering() {
        assert_eq!(CellValue::Int(30).as_text(), "30");
        assert_eq!(CellValue::Number(2.5).as_text(), "2.5");
        assert_eq!(CellValue::Boolean(true).as_text(), "TRUE");
        assert_eq!(CellValue::Empty.as_text(), "");
        assert_eq!(CellValue::Error(CellErrorKind::Na).as_text(), "#N/A");
    }

    #[test]
    fn option_conversion_maps_none_to_empty() {
        assert_eq!(CellValue::from(None::<i64>), CellValue::Empty);
        assert_eq!(CellValue::from(Some("x")), CellValue::Text("x".into()));
    }
}
