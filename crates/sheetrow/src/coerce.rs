//! Cell → field conversions.
//!
//! Each supported field type implements [`CellField`]. Every numeric kind has
//! its own conversion with a fixed overflow rule: out of range fails and
//! fractional values never truncate into integers.

use crate::error::CoerceError;
use crate::locale::DateLocale;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sheetrow_common::{CellValue, DateSystem};
use std::borrow::Cow;

/// Per-pass settings the conversions need.
#[derive(Debug, Clone, Copy)]
pub struct CoerceContext<'a> {
    pub locale: &'a DateLocale,
    pub date_system: DateSystem,
}

/// Read-only view of an assigned field value, used by constraints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldView<'a> {
    Null,
    Text(&'a str),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Variant(&'static str),
}

impl FieldView<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldView::Null)
    }

    /// Textual form for pattern and membership checks.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FieldView::Null => None,
            FieldView::Text(s) => Some(Cow::Borrowed(s)),
            FieldView::Variant(s) => Some(Cow::Borrowed(s)),
            FieldView::Number(n) => Some(Cow::Owned(n.to_string())),
            FieldView::Boolean(b) => Some(Cow::Owned(b.to_string())),
            FieldView::DateTime(dt) => Some(Cow::Owned(dt.to_string())),
        }
    }

    /// Numeric form for range checks; datetimes compare by 1900 serial.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldView::Number(n) => Some(*n),
            FieldView::DateTime(dt) => Some(sheetrow_common::datetime_to_serial(dt)),
            _ => None,
        }
    }
}

/// A record field type the mapper can fill from a cell.
pub trait CellField: Sized {
    /// Type name reported as `expected` in failure records.
    const EXPECTED: &'static str;

    /// Convert a raw cell. `None` is a blank cell.
    fn from_cell(cell: Option<&CellValue>, ctx: &CoerceContext<'_>) -> Result<Self, CoerceError>;

    fn view(&self) -> FieldView<'_>;
}

fn blank(cell: Option<&CellValue>) -> Option<&CellValue> {
    cell.filter(|value| !value.is_empty())
}

impl CellField for String {
    const EXPECTED: &'static str = "string";

    fn from_cell(cell: Option<&CellValue>, _ctx: &CoerceContext<'_>) -> Result<Self, CoerceError> {
        Ok(blank(cell).map(|value| value.as_text().into_owned()).unwrap_or_default())
    }

    fn view(&self) -> FieldView<'_> {
        FieldView::Text(self)
    }
}

fn temporal(cell: Option<&CellValue>, ctx: &CoerceContext<'_>) -> Result<NaiveDateTime, CoerceError> {
    let value = blank(cell).ok_or(CoerceError::Blank)?;
    match value {
        CellValue::DateTime(dt) => return Ok(*dt),
        CellValue::Date(d) => return Ok(d.and_time(NaiveTime::MIN)),
        CellValue::Error(e) => return Err(CoerceError::ErrorValue(*e)),
        _ => {}
    }

    // Text parse first, then the raw value as a serial; the order is fixed.
    let text = value.as_text();
    if let Some(dt) = ctx.locale.parse_datetime(&text) {
        return Ok(dt);
    }
    let serial = match value {
        CellValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CoerceError::Unparseable(s.clone()))?,
        other => other
            .as_serial_number()
            .ok_or(CoerceError::WrongType(other.type_name()))?,
    };
    ctx.date_system
        .serial_to_datetime(serial)
        .ok_or(CoerceError::InvalidSerial(serial))
}

impl CellField for NaiveDateTime {
    const EXPECTED: &'static str = "datetime";

    fn from_cell(cell: Option<&CellValue>, ctx: &CoerceContext<'_>) -> Result<Self, CoerceError> {
        temporal(cell, ctx)
    }

    fn view(&self) -> FieldView<'_> {
        FieldView::DateTime(*self)
    }
}

impl CellField for NaiveDate {
    const EXPECTED: &'static str = "date";

    fn from_cell(cell: Option<&CellValue>, ctx: &CoerceContext<'_>) -> Result<Self, CoerceError> {
        temporal(cell, ctx).map(|dt| dt.date())
    }

    fn view(&self) -> FieldView<'_> {
        FieldView::DateTime(self.and_time(NaiveTime::MIN))
    }
}

impl CellField for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_cell(cell: Option<&CellValue>, _ctx: &CoerceContext<'_>) -> Result<Self, CoerceError> {
        match blank(cell) {
            None => Ok(false),
            Some(CellValue::Boolean(b)) => Ok(*b),
            Some(CellValue::Int(i)) => Ok(*i != 0),
            Some(CellValue::Number(n)) => Ok(*n != 0.0),
            Some(CellValue::Text(s)) => {
                let trimmed = s.trim();
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|n| !n.is_nan())
                        .map(|n| n != 0.0)
                        .ok_or_else(|| CoerceError::Unparseable(s.clone()))
                }
            }
            Some(CellValue::Error(e)) => Err(CoerceError::ErrorValue(*e)),
            Some(other) => Err(CoerceError::WrongType(other.type_name())),
        }
    }

    fn view(&self) -> FieldView<'_> {
        FieldView::Boolean(*self)
    }
}

/// Integer read from any cell, before narrowing to the field's width.
fn wide_integer(cell: Option<&CellValue>) -> Result<i128, CoerceError> {
    match blank(cell).ok_or(CoerceError::Blank)? {
        CellValue::Int(i) => Ok(*i as i128),
        CellValue::Number(n) => integral(*n),
        CellValue::Boolean(b) => Ok(*b as i128),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<i128>() {
                Ok(i) => Ok(i),
                Err(_) => trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| CoerceError::Unparseable(s.clone()))
                    .and_then(integral),
            }
        }
        CellValue::Error(e) => Err(CoerceError::ErrorValue(*e)),
        other => Err(CoerceError::WrongType(other.type_name())),
    }
}

fn integral(n: f64) -> Result<i128, CoerceError> {
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(CoerceError::NotIntegral(n));
    }
    // `as` saturates; the narrowing conversion catches anything that did.
    Ok(n as i128)
}

macro_rules! integer_fields {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl CellField for $ty {
                const EXPECTED: &'static str = stringify!($ty);

                fn from_cell(
                    cell: Option<&CellValue>,
                    _ctx: &CoerceContext<'_>,
                ) -> Result<Self, CoerceError> {
                    let wide = wide_integer(cell)?;
                    <$ty>::try_from(wide).map_err(|_| CoerceError::Overflow(wide.to_string()))
                }

                fn view(&self) -> FieldView<'_> {
                    FieldView::Number(*self as f64)
                }
            }
        )+
    };
}

integer_fields!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn float(cell: Option<&CellValue>) -> Result<f64, CoerceError> {
    match blank(cell).ok_or(CoerceError::Blank)? {
        CellValue::Int(i) => Ok(*i as f64),
        CellValue::Number(n) => Ok(*n),
        CellValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        CellValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| CoerceError::Unparseable(s.clone())),
        CellValue::Error(e) => Err(CoerceError::ErrorValue(*e)),
        other => Err(CoerceError::WrongType(other.type_name())),
    }
}

impl CellField for f64 {
    const EXPECTED: &'static str = "f64";

    fn from_cell(cell: Option<&CellValue>, _ctx: &CoerceContext<'_>) -> Result<Self, CoerceError> {
        float(cell)
    }

    fn view(&self) -> FieldView<'_> {
        FieldView::Number(*self)
    }
}

impl CellField for f32 {
    const EXPECTED: &'static str = "f32";

    fn from_cell(cell: Option<&CellValue>, _ctx: &CoerceContext<'_>) -> Result<Self, CoerceError> {
        let value = float(cell)?;
        if value.is_finite() && value.abs() > f32::MAX as f64 {
            return Err(CoerceError::Overflow(value.to_string()));
        }
        Ok(value as f32)
    }

    fn view(&self) -> FieldView<'_> {
        FieldView::Number(*self as f64)
    }
}

/// Nullable wrapper: a blank cell is `None`, anything else converts as `V`.
impl<V: CellField> CellField for Option<V> {
    const EXPECTED: &'static str = V::EXPECTED;

    fn from_cell(cell: Option<&CellValue>, ctx: &CoerceContext<'_>) -> Result<Self, CoerceError> {
        match blank(cell) {
            None => Ok(None),
            Some(value) => V::from_cell(Some(value), ctx).map(Some),
        }
    }

    fn view(&self) -> FieldView<'_> {
        match self {
            Some(value) => value.view(),
            None => FieldView::Null,
        }
    }
}

/// How an enum cell should be looked up.
#[doc(hidden)]
#[derive(Debug, Clone, PartialEq)]
pub enum EnumKey<'a> {
    Name(&'a str),
    Discriminant(i64),
}

/// Classify a cell for enum lookup: text by member name, everything else by
/// the underlying discriminant.
#[doc(hidden)]
pub fn enum_key(cell: Option<&CellValue>) -> Result<EnumKey<'_>, CoerceError> {
    match blank(cell).ok_or(CoerceError::Blank)? {
        CellValue::Text(s) => Ok(EnumKey::Name(s.trim())),
        CellValue::Int(i) => Ok(EnumKey::Discriminant(*i)),
        CellValue::Number(n) => {
            let wide = integral(*n)?;
            i64::try_from(wide)
                .map(EnumKey::Discriminant)
                .map_err(|_| CoerceError::Overflow(wide.to_string()))
        }
        CellValue::Boolean(b) => Ok(EnumKey::Discriminant(*b as i64)),
        CellValue::Error(e) => Err(CoerceError::ErrorValue(*e)),
        other => Err(CoerceError::WrongType(other.type_name())),
    }
}

/// Implement [`CellField`] for a fieldless enum.
///
/// Text cells match variant names case-insensitively (numeric text falls
/// back to a discriminant lookup); numeric cells match discriminants.
///
/// ```
/// use sheetrow::cell_enum;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Default)]
/// enum Status {
///     #[default]
///     Active = 1,
///     Retired = 2,
/// }
///
/// cell_enum!(Status { Active, Retired });
/// ```
#[macro_export]
macro_rules! cell_enum {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::CellField for $name {
            const EXPECTED: &'static str = stringify!($name);

            fn from_cell(
                cell: ::core::option::Option<&$crate::CellValue>,
                _ctx: &$crate::CoerceContext<'_>,
            ) -> ::core::result::Result<Self, $crate::CoerceError> {
                let discriminant = match $crate::coerce::enum_key(cell)? {
                    $crate::coerce::EnumKey::Name(name) => {
                        $(
                            if name.eq_ignore_ascii_case(stringify!($variant)) {
                                return Ok($name::$variant);
                            }
                        )+
                        match name.parse::<i64>() {
                            Ok(d) => d,
                            Err(_) => {
                                return Err($crate::CoerceError::UnknownVariant(name.to_string()));
                            }
                        }
                    }
                    $crate::coerce::EnumKey::Discriminant(d) => d,
                };
                $(
                    if discriminant == $name::$variant as i64 {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::CoerceError::UnknownDiscriminant(discriminant))
            }

            fn view(&self) -> $crate::FieldView<'_> {
                match self {
                    $($name::$variant => $crate::FieldView::Variant(stringify!($variant)),)+
                }
            }
        }
    };
}
