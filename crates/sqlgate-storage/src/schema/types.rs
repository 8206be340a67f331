//! Catalog records returned by the schema inspector.

use serde::Serialize;

/// One row of `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub ordinal: i64,
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
}

/// One row of `PRAGMA foreign_key_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRef {
    pub id: i64,
    pub sequence: i64,
    pub parent_table: String,
    pub child_column: String,
    /// `None` when the constraint references the parent's primary key implicitly.
    pub parent_column: Option<String>,
    pub on_update: String,
    pub on_delete: String,
    pub match_mode: String,
}

/// A unique index and the columns it covers, in index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueIndex {
    pub name: String,
    pub columns: Vec<String>,
}

impl UniqueIndex {
    /// True if the index covers exactly `columns`, in that order.
    pub fn covers(&self, columns: &[&str]) -> bool {
        self.columns.len() == columns.len()
            && self
                .columns
                .iter()
                .zip(columns)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl TableColumn {
    /// Case-insensitive check of the declared type, e.g. `has_type("integer")`.
    pub fn has_type(&self, declared_type: &str) -> bool {
        self.declared_type.eq_ignore_ascii_case(declared_type)
    }
}
