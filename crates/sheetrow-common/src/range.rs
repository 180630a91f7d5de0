use std::fmt;

use crate::{CellRef, RangeError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Inclusive, 1-based rectangular block on a named worksheet.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeAddress {
    pub sheet: String,
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl RangeAddress {
    pub fn new(
        sheet: impl Into<String>,
        start_row: u32,
        start_col: u32,
        end_row: u32,
        end_col: u32,
    ) -> Result<Self, RangeError> {
        if start_row == 0 || start_col == 0 || end_row == 0 || end_col == 0 {
            return Err(RangeError::ZeroCoordinate);
        }
        if start_row > end_row || start_col > end_col {
            return Err(RangeError::Unordered);
        }
        Ok(Self {
            sheet: sheet.into(),
            start_row,
            start_col,
            end_row,
            end_col,
        })
    }

    pub fn start(&self) -> CellRef {
        CellRef {
            row: self.start_row,
            col: self.start_col,
        }
    }

    pub fn end(&self) -> CellRef {
        CellRef {
            row: self.end_row,
            col: self.end_col,
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}:{}", self.sheet, self.start(), self.end())
    }
}
