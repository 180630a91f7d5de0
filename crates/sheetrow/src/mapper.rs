use crate::binding::{Binding, Bindings};
use crate::coerce::CoerceContext;
use crate::config::MapperConfig;
use crate::error::{CellFailure, FailureKind, MapError};
use crate::schema::{FieldDef, Record, Schema};
use crate::table::TableSource;
use sheetrow_common::CellRef;
use std::iter::FusedIterator;
use std::ops::RangeInclusive;

/// Maps the data rows of one table onto records of type `T`.
///
/// Column bindings are resolved at the start of every pass, so a mapper can
/// be reused after the host table changes shape.
pub struct Mapper<'t, T, S: ?Sized> {
    table: &'t S,
    schema: Schema<T>,
    config: MapperConfig<T>,
}

impl<'t, T, S> Mapper<'t, T, S>
where
    T: Record,
    S: TableSource + ?Sized,
{
    /// Mapper using `T`'s own schema and configuration.
    pub fn new(table: &'t S) -> Self {
        Self::with_schema(table, T::schema())
    }

    /// Mapper using an explicit schema; `T::configure` still applies.
    pub fn with_schema(table: &'t S, schema: Schema<T>) -> Self {
        let mut config = MapperConfig::default();
        T::configure(&mut config);
        Self {
            table,
            schema,
            config,
        }
    }

    /// Run a caller configurator after the type's own defaults.
    pub fn configure<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut MapperConfig<T>),
    {
        configure(&mut self.config);
        self
    }

    /// Replace the configuration wholesale.
    pub fn with_config(mut self, config: MapperConfig<T>) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MapperConfig<T> {
        &self.config
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    pub fn table(&self) -> &'t S {
        self.table
    }

    pub fn bindings(&self) -> Result<Bindings<T>, MapError> {
        Bindings::resolve(&self.schema, self.table)
    }

    /// Worksheet rows holding data: the table range minus a header row (when
    /// configured and shown) and a totals row (when shown). May be empty.
    pub fn data_rows(&self) -> RangeInclusive<u32> {
        let range = self.table.range();
        let mut start = range.start_row;
        let mut end = range.end_row;
        if self.config.has_header_row && self.table.show_header() {
            match start.checked_add(1) {
                Some(next) => start = next,
                None => return empty_rows(),
            }
        }
        if self.table.show_totals() {
            match end.checked_sub(1) {
                Some(prev) => end = prev,
                None => return empty_rows(),
            }
        }
        start..=end
    }

    pub fn is_empty(&self) -> bool {
        self.data_rows().is_empty()
    }

    /// Lazily map rows in order.
    ///
    /// Binding resolution happens here, so a missing required column fails
    /// before any row is read (even when the table has no data rows).
    pub fn rows(&mut self) -> Result<RowIter<'_, T, S>, MapError> {
        let bindings = self.bindings()?;
        let rows = self.data_rows();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            table = self.table.name(),
            first_row = *rows.start(),
            last_row = *rows.end(),
            bound = bindings.resolved().count(),
            "mapping table rows"
        );
        Ok(RowIter {
            table: self.table,
            schema: &self.schema,
            config: &mut self.config,
            bindings,
            rows,
            done: false,
        })
    }

    /// Map every row, stopping at the first raised failure.
    pub fn to_vec(&mut self) -> Result<Vec<T>, MapError> {
        self.rows()?.collect()
    }

    /// Convert every bound cell without keeping the records, collecting all
    /// failures instead of stopping at them. Throw flags and the row callback
    /// are ignored; only binding resolution can fail.
    pub fn validate(&self) -> Result<Vec<CellFailure>, MapError> {
        let bindings = self.bindings()?;
        let ctx = self.config.coerce_context();
        let mut failures = Vec::new();
        for row in self.data_rows() {
            let mut item = T::default();
            for binding in bindings.resolved() {
                let def = &self.schema.fields()[binding.field];
                if let Err(failure) = map_cell(self.table, def, binding, row, &mut item, &ctx) {
                    failures.push(failure);
                }
            }
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            table = self.table.name(),
            failures = failures.len(),
            "validated table rows"
        );
        Ok(failures)
    }
}

/// Iterator over mapped rows; see [`Mapper::rows`].
///
/// Yields `Err` at most once, after which it is exhausted.
pub struct RowIter<'m, T, S: ?Sized> {
    table: &'m S,
    schema: &'m Schema<T>,
    config: &'m mut MapperConfig<T>,
    bindings: Bindings<T>,
    rows: RangeInclusive<u32>,
    done: bool,
}

impl<T, S> RowIter<'_, T, S>
where
    T: Record,
    S: TableSource + ?Sized,
{
    pub fn bindings(&self) -> &Bindings<T> {
        &self.bindings
    }

    fn raise(&self, failure: CellFailure) -> MapError {
        match failure.kind {
            FailureKind::Coercion => MapError::Cast {
                message: failure.render(&self.config.cast_error_template),
                failure,
            },
            FailureKind::Constraint => MapError::Validation {
                message: failure.render(&self.config.validation_error_template),
                failure,
            },
        }
    }

    fn throws(&self, kind: FailureKind) -> bool {
        match kind {
            FailureKind::Coercion => self.config.throw_on_cast_failure,
            FailureKind::Constraint => self.config.throw_on_validation_failure,
        }
    }
}

impl<T, S> Iterator for RowIter<'_, T, S>
where
    T: Record,
    S: TableSource + ?Sized,
{
    type Item = Result<T, MapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let row = self.rows.next()?;
        let mut item = T::default();
        let mut failed = None;
        {
            let ctx = self.config.coerce_context();
            for binding in self.bindings.resolved() {
                let def = &self.schema.fields()[binding.field];
                if let Err(failure) = map_cell(self.table, def, binding, row, &mut item, &ctx) {
                    failed = Some(failure);
                    break;
                }
            }
        }

        if let Some(failure) = failed {
            if self.throws(failure.kind) {
                self.done = true;
                let err = self.raise(failure);
                #[cfg(feature = "tracing")]
                tracing::warn!(table = self.table.name(), row, error = %err, "raising cell failure");
                return Some(Err(err));
            }
            #[cfg(feature = "tracing")]
            tracing::debug!(
                table = self.table.name(),
                row,
                failure = %failure,
                "skipped rest of row after cell failure"
            );
        }

        self.config.notify_row(&item, row);
        Some(Ok(item))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let (_, upper) = self.rows.size_hint();
        (0, upper)
    }
}

impl<T, S> FusedIterator for RowIter<'_, T, S>
where
    T: Record,
    S: TableSource + ?Sized,
{
}

#[allow(clippy::reversed_empty_ranges)]
fn empty_rows() -> RangeInclusive<u32> {
    1..=0
}

/// Convert one bound cell into `item` and run the field's constraints.
fn map_cell<T, S>(
    table: &S,
    def: &FieldDef<T>,
    binding: &Binding,
    row: u32,
    item: &mut T,
    ctx: &CoerceContext<'_>,
) -> Result<(), CellFailure>
where
    S: TableSource + ?Sized,
{
    let Some(position) = binding.column else {
        return Ok(());
    };
    // columns past the last sheet column read as blank
    let cell = CellRef {
        row,
        col: table.range().start_col.saturating_add(position),
    };
    let raw = table.cell(cell.row, cell.col);
    let failure = |kind, reason: String| CellFailure {
        kind,
        column: binding.display_name.clone().unwrap_or_default(),
        field: def.name().to_string(),
        expected: def.expected().to_string(),
        value: raw.cloned().unwrap_or_default(),
        cell,
        reason,
    };

    if let Err(err) = def.assign(item, raw, ctx) {
        return Err(failure(FailureKind::Coercion, err.to_string()));
    }
    def.validate(item)
        .map_err(|reason| failure(FailureKind::Constraint, reason))
}

/// Mapping entry points on any [`TableSource`].
pub trait TableExt: TableSource {
    fn mapper<T: Record>(&self) -> Mapper<'_, T, Self> {
        Mapper::new(self)
    }

    fn to_records<T: Record>(&self) -> Result<Vec<T>, MapError> {
        self.mapper::<T>().to_vec()
    }

    fn validate_records<T: Record>(&self) -> Result<Vec<CellFailure>, MapError> {
        self.mapper::<T>().validate()
    }
}

impl<S: TableSource + ?Sized> TableExt for S {}
