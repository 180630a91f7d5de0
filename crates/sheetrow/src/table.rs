//! The host table contract and an in-memory implementation of it.
//!
//! Real hosts (an xlsx reader, a workbook engine) implement [`TableSource`]
//! over their own object model; the mapper never needs more than what the
//! trait exposes.

use crate::error::TableError;
use sheetrow_common::{CellValue, RangeAddress};

/// One column of a host table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub name: String,
    /// 0-based offset from the table's first column.
    pub position: u32,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Read-only view of a named table (Excel ListObject) on a worksheet.
pub trait TableSource {
    fn name(&self) -> &str;

    /// Full address of the table, header and totals rows included.
    fn range(&self) -> &RangeAddress;

    /// Whether the first row of [`TableSource::range`] is a visible header row.
    fn show_header(&self) -> bool;

    /// Whether the last row of [`TableSource::range`] is a totals row.
    fn show_totals(&self) -> bool;

    /// Columns in table order.
    fn columns(&self) -> &[TableColumn];

    /// Cell at an absolute, 1-based worksheet coordinate. `None` means blank
    /// or outside the table; callers treat both like [`CellValue::Empty`].
    fn cell(&self, row: u32, col: u32) -> Option<&CellValue>;
}

/// Table held entirely in memory, row-major over the whole address range.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTable {
    name: String,
    range: RangeAddress,
    show_header: bool,
    show_totals: bool,
    columns: Vec<TableColumn>,
    cells: Vec<Vec<CellValue>>,
}

impl MemoryTable {
    pub fn builder(name: impl Into<String>) -> MemoryTableBuilder {
        MemoryTableBuilder::new(name)
    }

    /// Overwrite a cell by absolute coordinate. Returns `false` when the
    /// coordinate lies outside the table.
    pub fn set_cell(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> bool {
        if !self.range.contains(row, col) {
            return false;
        }
        let r = (row - self.range.start_row) as usize;
        let c = (col - self.range.start_col) as usize;
        self.cells[r][c] = value.into();
        true
    }
}

impl TableSource for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn range(&self) -> &RangeAddress {
        &self.range
    }

    fn show_header(&self) -> bool {
        self.show_header
    }

    fn show_totals(&self) -> bool {
        self.show_totals
    }

    fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        if !self.range.contains(row, col) {
            return None;
        }
        let r = (row - self.range.start_row) as usize;
        let c = (col - self.range.start_col) as usize;
        self.cells
            .get(r)
            .and_then(|cells| cells.get(c))
            .filter(|value| !value.is_empty())
    }
}

/// Fluent constructor for [`MemoryTable`].
///
/// Rows shorter than the header are padded with blanks; longer rows are
/// rejected.
#[derive(Debug, Clone)]
pub struct MemoryTableBuilder {
    name: String,
    sheet: String,
    anchor: (u32, u32),
    show_header: bool,
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    totals: Option<Vec<CellValue>>,
}

impl MemoryTableBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sheet: "Sheet1".to_string(),
            anchor: (1, 1),
            show_header: true,
            headers: Vec::new(),
            rows: Vec::new(),
            totals: None,
        }
    }

    pub fn sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }

    /// Top-left cell of the table (1-based).
    pub fn anchor(mut self, row: u32, col: u32) -> Self {
        self.anchor = (row, col);
        self
    }

    /// Hide the header row. Column names are kept for binding but the row
    /// itself is not part of the address range.
    pub fn show_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn row<I, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn totals<I, V>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.totals = Some(cells.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<MemoryTable, TableError> {
        if self.name.is_empty() {
            return Err(TableError::EmptyName);
        }
        let width = self.headers.len();
        if width == 0 {
            return Err(TableError::NoColumns { table: self.name });
        }

        let mut cells = Vec::with_capacity(self.rows.len() + 2);
        if self.show_header {
            cells.push(
                self.headers
                    .iter()
                    .map(|h| CellValue::Text(h.clone()))
                    .collect(),
            );
        }
        let show_totals = self.totals.is_some();
        let body = self.rows.into_iter().chain(self.totals);
        for (idx, mut row) in body.enumerate() {
            if row.len() > width {
                return Err(TableError::RowTooWide {
                    table: self.name,
                    row: idx,
                    found: row.len(),
                    expected: width,
                });
            }
            row.resize(width, CellValue::Empty);
            cells.push(row);
        }
        if cells.is_empty() {
            return Err(TableError::NoRows { table: self.name });
        }

        let (row, col) = self.anchor;
        let extent = u32::try_from(cells.len() - 1)
            .ok()
            .and_then(|height| row.checked_add(height))
            .zip(
                u32::try_from(width - 1)
                    .ok()
                    .and_then(|width| col.checked_add(width)),
            );
        let Some((end_row, end_col)) = extent else {
            return Err(TableError::OutOfSheet { table: self.name });
        };
        let range = RangeAddress::new(self.sheet, row, col, end_row, end_col).map_err(|source| {
            TableError::Placement {
                table: self.name.clone(),
                source,
            }
        })?;

        let columns = self
            .headers
            .into_iter()
            .enumerate()
            .map(|(pos, name)| TableColumn::new(name, pos as u32))
            .collect();

        Ok(MemoryTable {
            name: self.name,
            range,
            show_header: self.show_header,
            show_totals,
            columns,
            cells,
        })
    }
}
