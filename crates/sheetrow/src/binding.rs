use crate::error::MapError;
use crate::schema::{ColumnSelector, Schema};
use crate::table::{TableColumn, TableSource};
use rustc_hash::FxHashMap;
use std::fmt;
use std::marker::PhantomData;

/// Schema fields bound to the live columns of one table.
pub struct Bindings<T> {
    table: String,
    bindings: Vec<Binding>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Bindings<T> {
    /// Resolve every field of `schema` against `table`'s columns.
    ///
    /// Fails on the first required field without a column, or when two fields
    /// land on the same column.
    pub fn resolve<S>(schema: &Schema<T>, table: &S) -> Result<Self, MapError>
    where
        S: TableSource + ?Sized,
    {
        let columns = ColumnIndex::new(table.columns());
        let mut bindings = Vec::with_capacity(schema.len());
        let mut claimed: FxHashMap<u32, usize> = FxHashMap::default();

        for (field, def) in schema.fields().iter().enumerate() {
            let column = columns.lookup(def.selector(), def.name());
            match column {
                Some(col) => {
                    if let Some(&first) = claimed.get(&col.position) {
                        return Err(MapError::DuplicateColumn {
                            table: table.name().to_string(),
                            column: col.name.clone(),
                            first: schema.fields()[first].name().to_string(),
                            second: def.name().to_string(),
                        });
                    }
                    claimed.insert(col.position, field);
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        table = table.name(),
                        field = def.name(),
                        column = %col.name,
                        position = col.position,
                        "bound field"
                    );
                }
                None if def.is_optional() => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        table = table.name(),
                        field = def.name(),
                        "optional field has no column; skipping"
                    );
                }
                None => {
                    return Err(MapError::UnresolvedColumn {
                        table: table.name().to_string(),
                        column: selector_label(def.selector(), def.name()),
                        field: def.name().to_string(),
                    });
                }
            }
            bindings.push(Binding {
                field,
                field_name: def.name().to_string(),
                column: column.map(|c| c.position),
                display_name: column.map(|c| c.name.clone()),
                optional: def.is_optional(),
            });
        }

        Ok(Self {
            table: table.name().to_string(),
            bindings,
            _record: PhantomData,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Every binding in schema order, unresolved optional ones included.
    pub fn all(&self) -> &[Binding] {
        &self.bindings
    }

    /// Bindings that found a column.
    pub fn resolved(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.iter().filter(|b| b.column.is_some())
    }

    pub fn get(&self, field: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.field_name == field)
    }
}

impl<T> Clone for Bindings<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            bindings: self.bindings.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Bindings<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("table", &self.table)
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl<T> PartialEq for Bindings<T> {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.bindings == other.bindings
    }
}

/// One field's resolved column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Position of the field in its schema.
    pub field: usize,
    pub field_name: String,
    /// 0-based table column; `None` for an optional field with no column.
    pub column: Option<u32>,
    /// Column name as the table reports it.
    pub display_name: Option<String>,
    pub optional: bool,
}

impl Binding {
    pub fn is_resolved(&self) -> bool {
        self.column.is_some()
    }
}

struct ColumnIndex<'a> {
    columns: &'a [TableColumn],
    by_lower: FxHashMap<String, usize>,
}

impl<'a> ColumnIndex<'a> {
    fn new(columns: &'a [TableColumn]) -> Self {
        let mut by_lower = FxHashMap::default();
        for (i, col) in columns.iter().enumerate() {
            by_lower.entry(col.name.to_lowercase()).or_insert(i);
        }
        Self { columns, by_lower }
    }

    fn lookup(&self, selector: &ColumnSelector, field: &str) -> Option<&'a TableColumn> {
        let columns = self.columns;
        match selector {
            ColumnSelector::Implicit => columns.iter().find(|c| c.name == field),
            ColumnSelector::Index(index) => {
                let position = index.checked_sub(1)?;
                columns.iter().find(|c| c.position == position)
            }
            ColumnSelector::Name(name) => self
                .by_lower
                .get(&name.to_lowercase())
                .map(|&i| &columns[i]),
        }
    }
}

fn selector_label(selector: &ColumnSelector, field: &str) -> String {
    match selector {
        ColumnSelector::Implicit => field.to_string(),
        ColumnSelector::Name(name) => name.clone(),
        ColumnSelector::Index(index) => format!("#{index}"),
    }
}
