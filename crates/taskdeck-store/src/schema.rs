//! Schema definition and additive migrations.
//!
//! Every step is idempotent: tables and indexes use `IF NOT EXISTS`, late
//! columns go through [`ensure_column`], and the search index is rebuilt
//! only when it disagrees with `tasks`. Nothing here drops or rewrites data.

use rusqlite::Connection;
use tracing::debug;

use crate::error::StoreError;
use crate::search::SearchIndex;

pub const SCHEMA_VERSION: u32 = 2;

/// Busy timeout is applied separately from the configured options.
pub const PRAGMAS: &str = r"
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA synchronous = NORMAL;
";

/// Tables as a fresh database gets them. The `tasks` shape is a superset of
/// the first release, which lacked `position` and `updated_at`.
const CREATE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT DEFAULT '',
    priority TEXT NOT NULL DEFAULT 'Medium'
        CHECK(priority IN ('Low', 'Medium', 'High')),
    due_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Open'
        CHECK(status IN ('Open', 'In Progress', 'Done')),
    position INTEGER NOT NULL DEFAULT 0,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS task_tags (
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (task_id, tag_id)
);

CREATE TABLE IF NOT EXISTS subtasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Open'
        CHECK(status IN ('Open', 'Done')),
    position INTEGER NOT NULL DEFAULT 0,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS ai_suggestions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL
        CHECK(type IN ('due_soon', 'priority', 'missing_context', 'workload')),
    title TEXT NOT NULL,
    details TEXT NOT NULL,
    confidence REAL NOT NULL CHECK(confidence >= 0.0 AND confidence <= 1.0),
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

-- Full-text projection of tasks(title, description); rowid is the task id.
CREATE VIRTUAL TABLE IF NOT EXISTS tasks_fts USING fts5(
    title,
    description,
    tokenize='unicode61'
);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
";

/// Created after late columns exist, since some cover them.
const CREATE_INDEXES: &str = r"
CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks(position, due_date);
CREATE INDEX IF NOT EXISTS idx_tasks_status_priority ON tasks(status, priority);
CREATE INDEX IF NOT EXISTS idx_subtasks_task_position ON subtasks(task_id, position);
CREATE INDEX IF NOT EXISTS idx_task_tags_tag ON task_tags(tag_id);
CREATE INDEX IF NOT EXISTS idx_ai_suggestions_created ON ai_suggestions(created_at);
";

/// What a migration run changed.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub added_columns: Vec<&'static str>,
    pub search_reindexed: bool,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        !self.added_columns.is_empty() || self.search_reindexed
    }
}

/// Bring the schema up to [`SCHEMA_VERSION`] in one transaction.
pub fn migrate(conn: &Connection) -> Result<MigrationReport, StoreError> {
    let tx = conn.unchecked_transaction()?;
    let mut report = MigrationReport::default();

    tx.execute_batch(CREATE_TABLES)
        .map_err(|e| StoreError::Storage(format!("schema: {e}")))?;

    if ensure_column(&tx, "tasks", "position", "INTEGER NOT NULL DEFAULT 0")? {
        // Existing rows keep their insertion order.
        let _ = tx.execute("UPDATE tasks SET position = id", [])?;
        report.added_columns.push("tasks.position");
    }
    if ensure_column(&tx, "tasks", "updated_at", "TEXT")? {
        let _ = tx.execute(
            "UPDATE tasks SET updated_at = COALESCE(created_at, CURRENT_TIMESTAMP)",
            [],
        )?;
        report.added_columns.push("tasks.updated_at");
    }
    if ensure_column(&tx, "tasks", "description", "TEXT DEFAULT ''")? {
        report.added_columns.push("tasks.description");
    }

    tx.execute_batch(CREATE_INDEXES)
        .map_err(|e| StoreError::Storage(format!("indexes: {e}")))?;

    if search_out_of_sync(&tx)? {
        let rows = SearchIndex::rebuild(&tx)?;
        debug!(rows, "search index rebuilt");
        report.search_reindexed = true;
    }

    record_version(&tx)?;
    tx.commit()?;
    Ok(report)
}

/// Add `column` to `table` unless it already exists. Returns whether it was added.
pub fn ensure_column(
    conn: &Connection,
    table: &str,
    column: &str,
    definition: &str,
) -> Result<bool, StoreError> {
    if column_names(conn, table)?.iter().any(|c| c == column) {
        return Ok(false);
    }
    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))?;
    Ok(true)
}

fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn search_out_of_sync(conn: &Connection) -> Result<bool, StoreError> {
    let stale: bool = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM tasks) != (SELECT COUNT(*) FROM tasks_fts)
             OR EXISTS (SELECT 1 FROM tasks WHERE id NOT IN (SELECT rowid FROM tasks_fts))",
        [],
        |row| row.get(0),
    )?;
    Ok(stale)
}

fn record_version(conn: &Connection) -> Result<(), StoreError> {
    let current: Option<u32> = conn
        .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    match current {
        None => {
            let _ = conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        }
        Some(v) if v < SCHEMA_VERSION => {
            let _ = conn.execute("UPDATE schema_version SET version = ?1", [SCHEMA_VERSION])?;
        }
        Some(_) => {}
    }
    Ok(())
}
