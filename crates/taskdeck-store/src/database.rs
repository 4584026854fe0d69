use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;
use crate::schema;

/// Connection tuning applied when a store is opened.
#[derive(Clone, Debug)]
pub struct StoreOptions {
    /// How long a writer waits on a locked database file.
    pub busy_timeout_ms: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5000,
        }
    }
}

/// Thread-safe SQLite store handle.
///
/// A single connection behind a `parking_lot::Mutex`: one writer at a time,
/// and every read sees a consistent snapshot because nothing can interleave
/// with it. Cloning shares the same connection.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// Open or create a database at the given path and migrate it.
    pub fn open(path: &Path, options: &StoreOptions) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("create dir: {e}")))?;
        }

        let conn = Connection::open(path)?;
        Self::prepare(&conn, options)?;

        info!(path = %path.display(), "database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_owned(),
        })
    }

    /// Open a migrated in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(&conn, &StoreOptions::default())?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    fn prepare(conn: &Connection, options: &StoreOptions) -> Result<(), StoreError> {
        conn.busy_timeout(Duration::from_millis(u64::from(options.busy_timeout_ms)))?;
        conn.execute_batch(schema::PRAGMAS)
            .map_err(|e| StoreError::Storage(format!("pragmas: {e}")))?;
        let report = schema::migrate(conn)?;
        if report.changed() {
            info!(
                added_columns = ?report.added_columns,
                search_reindexed = report.search_reindexed,
                "schema migrated"
            );
        }
        Ok(())
    }

    /// Execute a closure with the database connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Execute a closure inside one transaction.
    ///
    /// Commits when the closure returns `Ok`; any error drops the
    /// transaction, which rolls back every statement it ran.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            path: self.path.clone(),
        }
    }
}
