use sheetrow_common::{CellErrorKind, CellRef, CellValue, RangeError};
use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which stage of the cell pipeline rejected a value.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The raw cell could not be converted to the field's type.
    Coercion,
    /// The converted value broke one of the field's constraints.
    Constraint,
}

/// Structured description of one rejected cell.
///
/// The same payload is produced whether failures are collected
/// ([`crate::Mapper::validate`]) or raised ([`MapError::Cast`],
/// [`MapError::Validation`]).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CellFailure {
    pub kind: FailureKind,
    /// Table column name as the host reports it.
    pub column: String,
    pub field: String,
    /// Type name of the target field (`i32`, `string`, `Status`, ...).
    pub expected: String,
    pub value: CellValue,
    pub cell: CellRef,
    pub reason: String,
}

impl CellFailure {
    /// Fill a message template.
    ///
    /// Recognised placeholders: `{column}`, `{field}`, `{expected}`,
    /// `{value}`, `{cell}`, `{reason}`. Anything else is left untouched.
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{column}", &self.column)
            .replace("{field}", &self.field)
            .replace("{expected}", &self.expected)
            .replace("{value}", &self.value.as_text())
            .replace("{cell}", &self.cell.to_string())
            .replace("{reason}", &self.reason)
    }
}

impl fmt::Display for CellFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self.kind {
            FailureKind::Coercion => "cannot convert",
            FailureKind::Constraint => "constraint failed for",
        };
        write!(
            f,
            "{}: {stage} column `{}` into field `{}` ({}): {}",
            self.cell, self.column, self.field, self.expected, self.reason
        )
    }
}

/// Errors surfaced by a mapping pass.
#[derive(Debug, Error)]
pub enum MapError {
    /// A required field found no column. Raised before any row is read.
    #[error("table `{table}` has no column `{column}` for required field `{field}`")]
    UnresolvedColumn {
        table: String,
        column: String,
        field: String,
    },
    /// Two fields resolved to the same table column.
    #[error("table `{table}` column `{column}` is bound to both `{first}` and `{second}`")]
    DuplicateColumn {
        table: String,
        column: String,
        first: String,
        second: String,
    },
    /// Coercion failure raised because `throw_on_cast_failure` is set.
    #[error("{message}")]
    Cast {
        message: String,
        failure: CellFailure,
    },
    /// Constraint failure raised because `throw_on_validation_failure` is set.
    #[error("{message}")]
    Validation {
        message: String,
        failure: CellFailure,
    },
}

impl MapError {
    /// Cell payload for per-cell errors; `None` for resolution errors.
    pub fn failure(&self) -> Option<&CellFailure> {
        match self {
            MapError::Cast { failure, .. } | MapError::Validation { failure, .. } => Some(failure),
            MapError::UnresolvedColumn { .. } | MapError::DuplicateColumn { .. } => None,
        }
    }
}

/// Why a raw cell could not become a field value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    #[error("cell is blank")]
    Blank,
    #[error("cell holds error value {0}")]
    ErrorValue(CellErrorKind),
    #[error("`{0}` cannot be read as the target type")]
    Unparseable(String),
    #[error("{0} is not a whole number")]
    NotIntegral(f64),
    #[error("{0} is out of range for the target type")]
    Overflow(String),
    #[error("`{0}` does not name a variant")]
    UnknownVariant(String),
    #[error("{0} does not match any variant")]
    UnknownDiscriminant(i64),
    #[error("{0} cells cannot be converted to the target type")]
    WrongType(&'static str),
    #[error("{0} is not a valid date serial")]
    InvalidSerial(f64),
}

/// Malformed input handed to [`crate::MemoryTableBuilder::build`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("table name cannot be empty")]
    EmptyName,
    #[error("table `{table}` declares no columns")]
    NoColumns { table: String },
    #[error("table `{table}` row {row} has {found} cells but only {expected} columns")]
    RowTooWide {
        table: String,
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("table `{table}` has no rows to address")]
    NoRows { table: String },
    #[error("table `{table}` extends past the last worksheet row or column")]
    OutOfSheet { table: String },
    #[error("table `{table}` cannot be placed: {source}")]
    Placement {
        table: String,
        #[source]
        source: RangeError,
    },
}
