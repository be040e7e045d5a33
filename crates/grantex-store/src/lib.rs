//! Grantex Storage Layer
//!
//! Implements the RecordStore trait using SQLite.
//!
//! # Architecture
//!
//! - One table (default `tb_bizup`) with a surrogate `id` and one `TEXT`
//!   column per schema field
//! - Rows are keyed by the `original_file_name` column (`UNIQUE NOT NULL`)
//! - The table follows the configured vocabulary: missing columns are added
//!   with `ALTER TABLE` when the store is opened
//!
//! # Examples
//!
//! ```no_run
//! use grantex_domain::FieldSchema;
//! use grantex_store::SqliteStore;
//!
//! let schema = FieldSchema::from_names(&["title_name"], &["area_name"]).unwrap();
//! let store = SqliteStore::open("grantex.db", &schema, "tb_bizup").unwrap();
//! // Store is now ready for upserts
//! store.close().unwrap();
//! ```

#![warn(missing_docs)]

use grantex_domain::traits::{RecordStore, UpsertOutcome};
use grantex_domain::{ExtractionRecord, FieldSchema, ORIGINAL_FILE_NAME_FIELD};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Default table name
pub const DEFAULT_TABLE: &str = "tb_bizup";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record has no `original_file_name`
    #[error("Record has no original_file_name")]
    MissingKey,

    /// Table or column name is not a plain SQL identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

/// SQLite-based implementation of RecordStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. The pipeline opens one store per
/// run and touches it from a single thread after all documents are processed.
pub struct SqliteStore {
    conn: Connection,
    table: String,
    columns: Vec<String>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and bring `table` up to date
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn open<P: AsRef<Path>>(
        path: P,
        schema: &FieldSchema,
        table: &str,
    ) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, schema, table)
    }

    /// In-memory store, mostly for tests
    pub fn in_memory(schema: &FieldSchema) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, schema, DEFAULT_TABLE)
    }

    fn with_connection(
        conn: Connection,
        schema: &FieldSchema,
        table: &str,
    ) -> Result<Self, StoreError> {
        check_identifier(table)?;
        let columns: Vec<String> = schema.all_columns().into_iter().map(String::from).collect();
        for column in &columns {
            check_identifier(column)?;
        }

        let store = Self {
            conn,
            table: table.to_string(),
            columns,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create the table if needed and add any missing columns
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let mut definitions = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
        for column in &self.columns {
            if column == ORIGINAL_FILE_NAME_FIELD {
                definitions.push(format!("{} TEXT UNIQUE NOT NULL", quote(column)));
            } else {
                definitions.push(format!("{} TEXT", quote(column)));
            }
        }
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote(&self.table),
            definitions.join(", ")
        ))?;

        let existing = self.existing_columns()?;
        for column in &self.columns {
            if !existing.contains(column) {
                info!("Adding column {} to {}", column, self.table);
                self.conn.execute_batch(&format!(
                    "ALTER TABLE {} ADD COLUMN {} TEXT",
                    quote(&self.table),
                    quote(column)
                ))?;
            }
        }
        Ok(())
    }

    fn existing_columns(&self) -> Result<HashSet<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote(&self.table)))?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(names)
    }

    /// Table this store writes to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Data columns, in schema order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Close the session, reporting any error from SQLite
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Database(e))
    }

    fn column_value(record: &ExtractionRecord, column: &str) -> String {
        record
            .get(column)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }
}

impl RecordStore for SqliteStore {
    type Error = StoreError;

    fn upsert(&mut self, record: &ExtractionRecord) -> Result<UpsertOutcome, Self::Error> {
        let key = record
            .text(ORIGINAL_FILE_NAME_FIELD)
            .filter(|key| !key.trim().is_empty())
            .ok_or(StoreError::MissingKey)?
            .to_string();

        let table = quote(&self.table);
        let tx = self.conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                &format!(
                    "SELECT id FROM {} WHERE {} = ?1",
                    table,
                    quote(ORIGINAL_FILE_NAME_FIELD)
                ),
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(id) => {
                // Blank values never erase what is stored
                let updates: Vec<(&str, String)> = self
                    .columns
                    .iter()
                    .filter(|column| !record.is_blank(column))
                    .map(|column| (column.as_str(), Self::column_value(record, column)))
                    .collect();

                let assignments: Vec<String> = updates
                    .iter()
                    .enumerate()
                    .map(|(i, (column, _))| format!("{} = ?{}", quote(column), i + 1))
                    .collect();

                let mut values: Vec<Value> =
                    updates.into_iter().map(|(_, v)| Value::Text(v)).collect();
                values.push(Value::Integer(id));

                tx.execute(
                    &format!(
                        "UPDATE {} SET {} WHERE id = ?{}",
                        table,
                        assignments.join(", "),
                        values.len()
                    ),
                    params_from_iter(values.iter()),
                )?;
                debug!("Updated row {} for {}", id, key);
                UpsertOutcome::Updated(id)
            }
            None => {
                let names: Vec<String> = self.columns.iter().map(|c| quote(c)).collect();
                let placeholders: Vec<String> =
                    (1..=self.columns.len()).map(|i| format!("?{}", i)).collect();
                let values: Vec<String> = self
                    .columns
                    .iter()
                    .map(|column| Self::column_value(record, column))
                    .collect();

                tx.execute(
                    &format!(
                        "INSERT INTO {} ({}) VALUES ({})",
                        table,
                        names.join(", "),
                        placeholders.join(", ")
                    ),
                    params_from_iter(values.iter()),
                )?;
                let id = tx.last_insert_rowid();
                debug!("Inserted row {} for {}", id, key);
                UpsertOutcome::Inserted(id)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn get_by_file_name(
        &self,
        original_file_name: &str,
    ) -> Result<Option<(i64, ExtractionRecord)>, Self::Error> {
        let names: Vec<String> = self.columns.iter().map(|c| quote(c)).collect();
        let sql = format!(
            "SELECT id, {} FROM {} WHERE {} = ?1",
            names.join(", "),
            quote(&self.table),
            quote(ORIGINAL_FILE_NAME_FIELD)
        );

        let row = self
            .conn
            .query_row(&sql, params![original_file_name], |row| {
                let id: i64 = row.get(0)?;
                let mut record = ExtractionRecord::new();
                for (i, column) in self.columns.iter().enumerate() {
                    let value: Option<String> = row.get(i + 1)?;
                    record.set_text(column, value.unwrap_or_default());
                }
                Ok((id, record))
            })
            .optional()?;

        Ok(row)
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote(&self.table)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn close(self) -> Result<(), Self::Error> {
        SqliteStore::close(self)
    }
}

/// Identifiers are restricted to `[A-Za-z_][A-Za-z0-9_]*` before quoting
fn check_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier)
}
