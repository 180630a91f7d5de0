//! Field descriptor tables for record types.
//!
//! A [`Schema`] lists, per field: how to find its column, whether it may be
//! missing, how to convert and assign a cell, and what to check afterwards.
//! Accessors are plain closures (`|r| &mut r.age`), so no name-based lookup
//! happens at runtime.

use crate::coerce::{CellField, CoerceContext};
use crate::config::MapperConfig;
use crate::constraint::Constraint;
use crate::error::CoerceError;
use sheetrow_common::CellValue;
use std::fmt;
use std::marker::PhantomData;

/// A type whose instances are built from table rows.
pub trait Record: Default + Sized + 'static {
    fn schema() -> Schema<Self>;

    /// Per-type defaults applied before any caller configurator.
    fn configure(_config: &mut MapperConfig<Self>) {}
}

/// How a field locates its column. Index and name are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnSelector {
    /// Column named exactly like the field.
    Implicit,
    /// 1-based position within the table.
    Index(u32),
    /// Column name, compared case-insensitively.
    Name(String),
}

/// Ordered field descriptors for `T`.
pub struct Schema<T> {
    fields: Vec<FieldDef<T>>,
}

impl<T: 'static> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { fields: Vec::new() }
    }
}

impl<T> Schema<T> {
    pub fn fields(&self) -> &[FieldDef<T>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef<T>> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("fields", &self.fields).finish()
    }
}

/// One field of a [`Schema`].
pub struct FieldDef<T> {
    name: String,
    selector: ColumnSelector,
    optional: bool,
    expected: &'static str,
    slot: Box<dyn Slot<T>>,
}

impl<T> FieldDef<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selector(&self) -> &ColumnSelector {
        &self.selector
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Type name of the field, as reported in failures.
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// Convert `cell` and store it in `target`.
    pub fn assign(
        &self,
        target: &mut T,
        cell: Option<&CellValue>,
        ctx: &CoerceContext<'_>,
    ) -> Result<(), CoerceError> {
        self.slot.assign(target, cell, ctx)
    }

    /// Run constraints and custom checks against the value now in `target`.
    pub fn validate(&self, target: &mut T) -> Result<(), String> {
        self.slot.validate(target)
    }
}

impl<T> fmt::Debug for FieldDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("selector", &self.selector)
            .field("optional", &self.optional)
            .field("expected", &self.expected)
            .finish_non_exhaustive()
    }
}

trait Slot<T>: Send + Sync {
    fn assign(
        &self,
        target: &mut T,
        cell: Option<&CellValue>,
        ctx: &CoerceContext<'_>,
    ) -> Result<(), CoerceError>;

    fn validate(&self, target: &mut T) -> Result<(), String>;
}

type Check<V> = Box<dyn Fn(&V) -> Result<(), String> + Send + Sync>;

struct TypedSlot<V, F> {
    get: F,
    constraints: Vec<Constraint>,
    checks: Vec<(String, Check<V>)>,
    _value: PhantomData<fn() -> V>,
}

impl<T, V, F> Slot<T> for TypedSlot<V, F>
where
    V: CellField,
    F: Fn(&mut T) -> &mut V + Send + Sync,
{
    fn assign(
        &self,
        target: &mut T,
        cell: Option<&CellValue>,
        ctx: &CoerceContext<'_>,
    ) -> Result<(), CoerceError> {
        let value = V::from_cell(cell, ctx)?;
        *(self.get)(target) = value;
        Ok(())
    }

    fn validate(&self, target: &mut T) -> Result<(), String> {
        let value: &V = (self.get)(target);
        let view = value.view();
        for constraint in &self.constraints {
            constraint.check(&view)?;
        }
        for (name, check) in &self.checks {
            check(value).map_err(|reason| format!("{name}: {reason}"))?;
        }
        Ok(())
    }
}

/// Accumulates finished fields.
pub struct SchemaBuilder<T> {
    fields: Vec<FieldDef<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Start a field bound to the column named like `name`.
    pub fn field<V, F>(self, name: impl Into<String>, get: F) -> FieldBuilder<T, V, F>
    where
        V: CellField + 'static,
        F: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        FieldBuilder {
            parent: self,
            name: name.into(),
            selector: ColumnSelector::Implicit,
            optional: false,
            constraints: Vec::new(),
            checks: Vec::new(),
            get,
        }
    }

    pub fn build(self) -> Schema<T> {
        Schema {
            fields: self.fields,
        }
    }
}

/// Field under construction; chain another `.field(..)` or `.build()` to
/// finish it.
pub struct FieldBuilder<T, V, F> {
    parent: SchemaBuilder<T>,
    name: String,
    selector: ColumnSelector,
    optional: bool,
    constraints: Vec<Constraint>,
    checks: Vec<(String, Check<V>)>,
    get: F,
}

impl<T, V, F> FieldBuilder<T, V, F>
where
    T: 'static,
    V: CellField + 'static,
    F: Fn(&mut T) -> &mut V + Send + Sync + 'static,
{
    /// Bind to the 1-based table column `index`. Replaces any column name.
    pub fn index(mut self, index: u32) -> Self {
        self.selector = ColumnSelector::Index(index);
        self
    }

    /// Bind to a column by name (case-insensitive). Replaces any index.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.selector = ColumnSelector::Name(name.into());
        self
    }

    /// Skip the field instead of failing when its column is missing.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Typed check; the error string becomes the failure reason.
    pub fn check<C>(mut self, name: impl Into<String>, check: C) -> Self
    where
        C: Fn(&V) -> Result<(), String> + Send + Sync + 'static,
    {
        self.checks.push((name.into(), Box::new(check)));
        self
    }

    pub fn field<V2, F2>(self, name: impl Into<String>, get: F2) -> FieldBuilder<T, V2, F2>
    where
        V2: CellField + 'static,
        F2: Fn(&mut T) -> &mut V2 + Send + Sync + 'static,
    {
        self.finish().field(name, get)
    }

    pub fn build(self) -> Schema<T> {
        self.finish().build()
    }

    fn finish(self) -> SchemaBuilder<T> {
        let mut parent = self.parent;
        parent.fields.push(FieldDef {
            name: self.name,
            selector: self.selector,
            optional: self.optional,
            expected: V::EXPECTED,
            slot: Box::new(TypedSlot {
                get: self.get,
                constraints: self.constraints,
                checks: self.checks,
                _value: PhantomData,
            }),
        });
        parent
    }
}
