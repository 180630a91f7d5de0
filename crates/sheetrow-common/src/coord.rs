//! Cell coordinates in the 1-based row/column space hosts expose, with
//! A1-style rendering for diagnostics.

use core::fmt;

use crate::RangeError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute, 1-based cell position on a worksheet.
///
/// `Display` renders the A1 form (`CellRef::new(3, 2)` → `B3`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    /// Fallible constructor; zero on either axis is rejected.
    pub fn new(row: u32, col: u32) -> Result<Self, RangeError> {
        if row == 0 || col == 0 {
            return Err(RangeError::ZeroCoordinate);
        }
        Ok(Self { row, col })
    }

    /// Column letters; a zero column (only reachable through the public
    /// fields) renders as `A`.
    pub fn col_letters(&self) -> String {
        column_to_letters(self.col.saturating_sub(1))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.col_letters(), self.row)
    }
}

/// Convert a 0-based column into Excel letters (0 ⇒ A, 26 ⇒ AA).
pub fn column_to_letters(mut col: u32) -> String {
    let mut buf = Vec::new();
    loop {
        let rem = (col % 26) as u8;
        buf.push(b'A' + rem);
        col /= 26;
        if col == 0 {
            break;
        }
        // Excel letters are 1-based internally
        col -= 1;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}
