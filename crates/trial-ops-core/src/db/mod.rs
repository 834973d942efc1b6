//! Database layer for trial-ops.

mod schema;
mod patients;
mod resources;
mod visit_types;
mod appointments;
mod inventory;
mod dispenses;
mod audit;
mod basic;

pub use schema::*;
#[allow(unused_imports)]
pub use basic::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction on the shared connection.
    ///
    /// The engines wrap their read-check-write sequences in one of these so
    /// a failure mid-sequence rolls everything back.
    pub fn unchecked_transaction(&self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trial-ops.db");

        let db = Database::open(&path).unwrap();
        drop(db);

        // Reopening an existing file must not fail on re-running the schema
        let db = Database::open(&path);
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"resources".to_string()));
        assert!(tables.contains(&"visit_types".to_string()));
        assert!(tables.contains(&"appointments".to_string()));
        assert!(tables.contains(&"inventory_items".to_string()));
        assert!(tables.contains(&"inventory_lots".to_string()));
        assert!(tables.contains(&"inventory_dispenses".to_string()));
        assert!(tables.contains(&"audit_logs".to_string()));
    }

    #[test]
    fn test_transaction_rollback_on_drop() {
        let db = Database::open_in_memory().unwrap();

        {
            let _tx = db.unchecked_transaction().unwrap();
            db.conn()
                .execute(
                    "INSERT INTO patients (id, first_name, last_name) VALUES ('p-1', 'Ada', 'Osei')",
                    [],
                )
                .unwrap();
            // Dropped without commit
        }

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
