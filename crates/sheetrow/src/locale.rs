use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::borrow::Cow;

const ISO_DATES: &[&str] = &[
    "%Y-%m-%d",  // 2024-01-15
    "%Y/%m/%d",  // 2024/01/15
    "%B %d, %Y", // January 15, 2024
    "%b %d, %Y", // Jan 15, 2024
    "%d-%b-%Y",  // 15-Jan-2024
    "%d %B %Y",  // 15 January 2024
];

const ISO_DATETIMES: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Text formats tried, in order, when a date or datetime field receives a
/// text cell.
///
/// Slash-separated day/month order is the only thing that genuinely differs
/// between the built-in locales; everything unambiguous is accepted by all
/// of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateLocale {
    name: Cow<'static, str>,
    date_formats: Vec<Cow<'static, str>>,
    datetime_formats: Vec<Cow<'static, str>>,
}

impl DateLocale {
    /// ISO and month-name forms only; no slash day/month guessing.
    pub fn invariant() -> Self {
        Self::from_static("invariant", &[], &[])
    }

    /// Month-first slash dates (`01/15/2024`).
    pub fn en_us() -> Self {
        Self::from_static(
            "en-US",
            &["%m/%d/%Y"],
            &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y %H:%M"],
        )
    }

    /// Day-first slash dates (`15/01/2024`).
    pub fn en_gb() -> Self {
        Self::from_static(
            "en-GB",
            &["%d/%m/%Y"],
            &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"],
        )
    }

    /// Caller-supplied chrono format strings only; the built-in ISO forms are
    /// not appended.
    pub fn custom<D, T, S>(name: impl Into<String>, date_formats: D, datetime_formats: T) -> Self
    where
        D: IntoIterator<Item = S>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Cow::Owned(name.into()),
            date_formats: date_formats
                .into_iter()
                .map(|f| Cow::Owned(f.into()))
                .collect(),
            datetime_formats: datetime_formats
                .into_iter()
                .map(|f| Cow::Owned(f.into()))
                .collect(),
        }
    }

    fn from_static(name: &'static str, dates: &[&'static str], datetimes: &[&'static str]) -> Self {
        Self {
            name: Cow::Borrowed(name),
            date_formats: dates
                .iter()
                .chain(ISO_DATES)
                .map(|f| Cow::Borrowed(*f))
                .collect(),
            datetime_formats: datetimes
                .iter()
                .chain(ISO_DATETIMES)
                .map(|f| Cow::Borrowed(*f))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parse_datetime(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        self.datetime_formats
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .or_else(|| {
                self.date_formats
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                    .map(|d| d.and_time(NaiveTime::MIN))
            })
    }
}

impl Default for DateLocale {
    fn default() -> Self {
        Self::invariant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(locale: &DateLocale, text: &str) -> Option<NaiveDate> {
        locale.parse_datetime(text).map(|dt| dt.date())
    }

    #[test]
    fn invariant_accepts_iso_and_month_names() {
        let locale = DateLocale::invariant();
        assert_eq!(day(&locale, "2024-01-15"), Some(date(2024, 1, 15)));
        assert_eq!(day(&locale, " Jan 15, 2024 "), Some(date(2024, 1, 15)));
        assert_eq!(day(&locale, "15 January 2024"), Some(date(2024, 1, 15)));
        assert_eq!(day(&locale, "01/02/2024"), None);
    }

    #[test]
    fn slash_order_depends_on_locale() {
        assert_eq!(
            day(&DateLocale::en_us(), "01/02/2024"),
            Some(date(2024, 1, 2))
        );
        assert_eq!(
            day(&DateLocale::en_gb(), "01/02/2024"),
            Some(date(2024, 2, 1))
        );
    }

    #[test]
    fn datetime_falls_back_to_date_at_midnight() {
        let locale = DateLocale::en_us();
        assert_eq!(
            locale.parse_datetime("2024-01-15 08:30:00"),
            date(2024, 1, 15).and_hms_opt(8, 30, 0)
        );
        assert_eq!(
            locale.parse_datetime("01/15/2024 02:30:00 PM"),
            date(2024, 1, 15).and_hms_opt(14, 30, 0)
        );
        assert_eq!(
            locale.parse_datetime("2024-01-15"),
            date(2024, 1, 15).and_hms_opt(0, 0, 0)
        );
        assert_eq!(
            day(&locale, "2024-01-15T23:59:00"),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn custom_formats_replace_builtins() {
        let locale = DateLocale::custom("compact", ["%Y%m%d"], Vec::<&str>::new());
        assert_eq!(locale.name(), "compact");
        assert_eq!(day(&locale, "20240115"), Some(date(2024, 1, 15)));
        assert_eq!(day(&locale, "2024-01-15"), None);
    }
}
