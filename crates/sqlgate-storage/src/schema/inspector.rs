//! SchemaInspector: read-only catalog queries for validators.
//!
//! Table names are spliced into PRAGMA commands, which cannot bind object
//! names, so each one goes through `identifier::validate` first. A rejected
//! name never reaches SQLite.

use rusqlite::{params, Connection, OptionalExtension};
use sqlgate_core::errors::StorageError;
use sqlgate_core::identifier;

use super::types::{ForeignKeyRef, TableColumn, UniqueIndex};
use crate::to_storage_err;

/// Catalog access bound to one connection. Inside an open transaction it
/// sees that transaction's uncommitted effects.
#[derive(Clone, Copy)]
pub struct SchemaInspector<'c> {
    conn: &'c Connection,
}

impl<'c> SchemaInspector<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Columns of `table` in declaration order. Empty if the table does not exist.
    pub fn columns(&self, table: &str) -> Result<Vec<TableColumn>, StorageError> {
        let table = identifier::validate(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info('{table}')"))
            .map_err(to_storage_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(TableColumn {
                    ordinal: row.get(0)?,
                    name: row.get(1)?,
                    declared_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default_value: row.get(4)?,
                    is_primary_key: row.get::<_, i64>(5)? > 0,
                })
            })
            .map_err(to_storage_err)?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(to_storage_err)?);
        }
        Ok(result)
    }

    /// Foreign keys declared on `table`, one entry per column mapping.
    pub fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRef>, StorageError> {
        let table = identifier::validate(table)?;
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA foreign_key_list('{table}')"))
            .map_err(to_storage_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ForeignKeyRef {
                    id: row.get(0)?,
                    sequence: row.get(1)?,
                    parent_table: row.get(2)?,
                    child_column: row.get(3)?,
                    parent_column: row.get(4)?,
                    on_update: row.get(5)?,
                    on_delete: row.get(6)?,
                    match_mode: row.get(7)?,
                })
            })
            .map_err(to_storage_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(to_storage_err)
    }

    /// Unique indexes on `table`, each with its columns in index order.
    ///
    /// Includes the automatic indexes SQLite creates for UNIQUE and
    /// non-rowid PRIMARY KEY constraints.
    pub fn unique_indexes(&self, table: &str) -> Result<Vec<UniqueIndex>, StorageError> {
        let table = identifier::validate(table)?;
        let index_names: Vec<String> = {
            let mut stmt = self
                .conn
                .prepare(&format!("PRAGMA index_list('{table}')"))
                .map_err(to_storage_err)?;
            let rows = stmt
                .query_map([], |row| {
                    let name: String = row.get(1)?;
                    let unique: i64 = row.get(2)?;
                    Ok((name, unique == 1))
                })
                .map_err(to_storage_err)?;

            let mut names = Vec::new();
            for row in rows {
                let (name, unique) = row.map_err(to_storage_err)?;
                if unique {
                    names.push(name);
                }
            }
            names
        };

        // Index names come from the catalog, not the caller, and may not be
        // plain identifiers, so they are bound instead of spliced.
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")
            .map_err(to_storage_err)?;

        let mut result = Vec::with_capacity(index_names.len());
        for name in index_names {
            let columns = stmt
                .query_map(params![name], |row| row.get::<_, Option<String>>(0))
                .map_err(to_storage_err)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(to_storage_err)?
                .into_iter()
                // Expression columns have no name.
                .flatten()
                .collect();
            result.push(UniqueIndex { name, columns });
        }
        Ok(result)
    }

    /// Run a single-value numeric query, e.g. `SELECT COUNT(*) FROM t WHERE ...`.
    ///
    /// No row or a NULL value reads as 0. Queries that would write are refused.
    pub fn scalar_count(&self, query: &str) -> Result<i64, StorageError> {
        let mut stmt = self.conn.prepare(query).map_err(to_storage_err)?;
        if !stmt.readonly() {
            return Err(StorageError::NotReadOnly {
                query: query.to_string(),
            });
        }
        let value: Option<Option<i64>> = stmt
            .query_row([], |row| row.get(0))
            .optional()
            .map_err(to_storage_err)?;
        Ok(value.flatten().unwrap_or(0))
    }

    /// True if a table named `table` exists.
    pub fn table_exists(&self, table: &str) -> Result<bool, StorageError> {
        let table = identifier::validate(table)?;
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                params![table],
                |row| row.get(0),
            )
            .map_err(to_storage_err)?;
        Ok(count > 0)
    }

    /// Number of rows currently in `table`.
    pub fn row_count(&self, table: &str) -> Result<i64, StorageError> {
        let table = identifier::validate(table)?;
        self.conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))
            .map_err(to_storage_err)
    }
}
