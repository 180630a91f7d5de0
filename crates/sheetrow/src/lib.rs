//! Typed row mapping for spreadsheet tables.
//!
//! A [`Record`] describes its fields once, as a [`Schema`] of column
//! selectors, conversions and constraints. A [`Mapper`] binds that schema to
//! the live columns of a [`TableSource`] and then either materializes one
//! record per data row ([`Mapper::rows`], [`Mapper::to_vec`]) or collects
//! every cell failure without stopping ([`Mapper::validate`]).
//!
//! ```
//! use sheetrow::{CellValue, Constraint, MemoryTable, Record, Schema, TableExt};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u32,
//!     email: Option<String>,
//! }
//!
//! impl Record for Person {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::builder()
//!             .field("name", |p| &mut p.name)
//!             .column("Name")
//!             .field("age", |p| &mut p.age)
//!             .index(2)
//!             .constraint(Constraint::max(150.0))
//!             .field("email", |p| &mut p.email)
//!             .column("E-mail")
//!             .optional()
//!             .build()
//!     }
//! }
//!
//! let table = MemoryTable::builder("People")
//!     .headers(["Name", "Age"])
//!     .row([CellValue::from("Alice"), CellValue::Int(30)])
//!     .row([CellValue::from("Bob"), CellValue::from("notanumber")])
//!     .build()?;
//!
//! let people: Vec<Person> = table.to_records()?;
//! assert_eq!(people[0].age, 30);
//! assert_eq!(people[1].name, "Bob");
//! assert_eq!(people[1].age, 0);
//!
//! let failures = table.validate_records::<Person>()?;
//! assert_eq!(failures.len(), 1);
//! assert_eq!(failures[0].cell.to_string(), "B3");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod binding;
pub mod coerce;
mod config;
mod constraint;
mod error;
mod locale;
mod mapper;
mod schema;
mod table;

pub use binding::{Binding, Bindings};
pub use coerce::{CellField, CoerceContext, FieldView};
pub use config::{
    DEFAULT_CAST_ERROR_TEMPLATE, DEFAULT_VALIDATION_ERROR_TEMPLATE, MapperConfig, RowCallback,
};
pub use constraint::Constraint;
pub use error::{CellFailure, CoerceError, FailureKind, MapError, TableError};
pub use locale::DateLocale;
pub use mapper::{Mapper, RowIter, TableExt};
pub use schema::{ColumnSelector, FieldBuilder, FieldDef, Record, Schema, SchemaBuilder};
pub use table::{MemoryTable, MemoryTableBuilder, TableColumn, TableSource};

pub use sheetrow_common::{CellErrorKind, CellRef, CellValue, DateSystem, RangeAddress};
