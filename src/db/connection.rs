use rusqlite::Connection;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::ServerError;

// Thread-local connection slot, tagged with the path it was opened for.
thread_local! {
    static DB_CONN: RefCell<Option<(PathBuf, Connection)>> = RefCell::new(None);
}

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Provides a mutable connection to the closure.
    ///
    /// Each worker thread keeps one connection. It is reopened when this
    /// thread last served a different database file.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, ServerError>
    where
        F: FnOnce(&mut Connection) -> Result<T, ServerError>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();
                let stale = !matches!(slot.as_ref(), Some((path, _)) if *path == self.path);
                if stale {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| ServerError::DbError(format!("Open DB failed: {e}")))?;
                    *slot = Some((self.path.clone(), conn));
                }
                match slot.as_mut() {
                    Some((_, conn)) => f(conn),
                    None => Err(ServerError::InternalError),
                }
            })
            .map_err(|_| ServerError::InternalError)?
    }
}

/// Initialize database from a SQL schema file
pub fn init_db(db: &Database, schema_path: &Path) -> Result<(), ServerError> {
    let schema_sql = fs::read_to_string(schema_path)
        .map_err(|e| ServerError::DbError(format!("Failed to read schema file: {e}")))?;

    apply_sql(db, &schema_sql)?;

    info!(
        schema = %schema_path.display(),
        db = %db.path().display(),
        "database initialized"
    );
    Ok(())
}

/// Runs a batch of SQL statements, e.g. the schema or demo seed data.
pub fn apply_sql(db: &Database, sql: &str) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute_batch(sql)
            .map_err(|e| ServerError::DbError(format!("Failed to apply SQL: {e}")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn count_tables(db: &Database) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )?)
        })
        .unwrap()
    }

    #[test]
    fn connection_follows_database_path() {
        let temp_dir = TempDir::new().unwrap();
        let first = Database::new(temp_dir.path().join("a.sqlite"));
        let second = Database::new(temp_dir.path().join("b.sqlite"));

        apply_sql(&first, "CREATE TABLE only_in_first (id INTEGER);").unwrap();

        assert_eq!(count_tables(&first), 1);
        assert_eq!(count_tables(&second), 0);
        assert_eq!(count_tables(&first), 1);
    }

    #[test]
    fn missing_schema_file_is_a_db_error() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("schema.sqlite"));
        let err = init_db(&db, Path::new("sql/does_not_exist.sql")).unwrap_err();
        assert!(matches!(err, ServerError::DbError(_)));
    }
}
