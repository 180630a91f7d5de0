//! Error codes a spreadsheet cell can hold (`#N/A`, `#VALUE!`, ...) and the
//! small structural errors raised by the address types in this crate.
//!
//! Cell errors are *data*: a host hands them out like any other cell value,
//! and the row mapper reports them as coercion failures for every field type
//! except text.

use std::{error::Error, fmt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// All recognised Excel error codes.
///
/// **Note:** names are CamelCase (idiomatic Rust) while `Display`
/// renders them exactly as Excel shows them (`#DIV/0!`, …).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CellErrorKind {
    Null,
    Ref,
    Name,
    Value,
    Div,
    Na,
    Num,
    Spill,
    Calc,
}

impl fmt::Display for CellErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "#NULL!",
            Self::Ref => "#REF!",
            Self::Name => "#NAME?",
            Self::Value => "#VALUE!",
            Self::Div => "#DIV/0!",
            Self::Na => "#N/A",
            Self::Num => "#NUM!",
            Self::Spill => "#SPILL!",
            Self::Calc => "#CALC!",
        })
    }
}

/// Invalid bounds handed to [`crate::RangeAddress::new`] or [`crate::CellRef::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// Rows and columns are 1-based; zero is never a valid coordinate.
    ZeroCoordinate,
    /// `start` lies below or to the right of `end`.
    Unordered,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::ZeroCoordinate => write!(f, "row and column indices must be 1-based"),
            RangeError::Unordered => write!(f, "range must be ordered: start <= end"),
        }
    }
}

impl Error for RangeError {}
