//! Schema introspection over the SQLite catalog.

pub mod inspector;
pub mod types;

pub use inspector::SchemaInspector;
pub use types::{ForeignKeyRef, TableColumn, UniqueIndex};
