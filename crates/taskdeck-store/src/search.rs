//! Full-text index over task titles and descriptions.
//!
//! `tasks_fts` is keyed by rowid = task id. It is written only through
//! [`SearchIndex`], and every caller does so on the same connection (and
//! therefore the same transaction) as the task row change it mirrors.

use std::collections::BTreeSet;

use rusqlite::{params, Connection};

use crate::error::StoreError;

/// Search index maintenance and queries. Stateless, every method takes `&Connection`.
pub struct SearchIndex;

impl SearchIndex {
    /// Replace the projection for one task.
    pub fn upsert(
        conn: &Connection,
        task_id: i64,
        title: &str,
        description: &str,
    ) -> Result<(), StoreError> {
        let _ = conn.execute("DELETE FROM tasks_fts WHERE rowid = ?1", [task_id])?;
        let _ = conn.execute(
            "INSERT INTO tasks_fts (rowid, title, description) VALUES (?1, ?2, ?3)",
            params![task_id, title, description],
        )?;
        Ok(())
    }

    /// Re-project a task from its current row. Removes the entry if the row is gone.
    pub fn reindex(conn: &Connection, task_id: i64) -> Result<(), StoreError> {
        let _ = conn.execute("DELETE FROM tasks_fts WHERE rowid = ?1", [task_id])?;
        let _ = conn.execute(
            "INSERT INTO tasks_fts (rowid, title, description)
             SELECT id, title, COALESCE(description, '') FROM tasks WHERE id = ?1",
            [task_id],
        )?;
        Ok(())
    }

    pub fn remove(conn: &Connection, task_id: i64) -> Result<(), StoreError> {
        let _ = conn.execute("DELETE FROM tasks_fts WHERE rowid = ?1", [task_id])?;
        Ok(())
    }

    /// Drop and re-project every task. Returns the number of indexed rows.
    pub fn rebuild(conn: &Connection) -> Result<usize, StoreError> {
        let _ = conn.execute("DELETE FROM tasks_fts", [])?;
        let rows = conn.execute(
            "INSERT INTO tasks_fts (rowid, title, description)
             SELECT id, title, COALESCE(description, '') FROM tasks",
            [],
        )?;
        Ok(rows)
    }

    /// Build an FTS5 MATCH expression from free text.
    ///
    /// Each whitespace-separated token becomes a quoted prefix term and the
    /// terms are ANDed. Quoting neutralises FTS5 operators and column
    /// filters in user input. Tokens with no letters or digits can never
    /// match and are dropped; `None` means nothing searchable remains.
    pub fn match_expression(terms: &str) -> Option<String> {
        let parts: Vec<String> = terms
            .split_whitespace()
            .filter(|token| token.chars().any(char::is_alphanumeric))
            .map(|token| format!("\"{}\"*", token.replace('"', "\"\"")))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" AND "))
        }
    }

    /// Ids of tasks whose title or description matches every term as a prefix.
    pub fn search(conn: &Connection, terms: &str) -> Result<BTreeSet<i64>, StoreError> {
        let Some(expr) = Self::match_expression(terms) else {
            return Ok(BTreeSet::new());
        };
        let mut stmt = conn.prepare("SELECT rowid FROM tasks_fts WHERE tasks_fts MATCH ?1")?;
        let ids = stmt
            .query_map([expr], |row| row.get::<_, i64>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(ids)
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn insert_task(conn: &Connection, title: &str, description: &str) -> i64 {
        conn.execute(
            "INSERT INTO tasks (title, description, priority, due_date) VALUES (?1, ?2, 'Medium', '2026-01-01')",
            params![title, description],
        )
        .unwrap();
        let id = conn.last_insert_rowid();
        SearchIndex::upsert(conn, id, title, description).unwrap();
        id
    }

    #[test]
    fn match_expression_quotes_every_token() {
        assert_eq!(
            SearchIndex::match_expression("login bug").as_deref(),
            Some("\"login\"* AND \"bug\"*")
        );
        assert_eq!(
            SearchIndex::match_expression("say \"hi\"").as_deref(),
            Some("\"say\"* AND \"\"\"hi\"\"\"*")
        );
        assert_eq!(SearchIndex::match_expression("  ").as_deref(), None);
        assert_eq!(SearchIndex::match_expression("* - ()").as_deref(), None);
    }

    #[test]
    fn prefix_terms_are_anded() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let a = insert_task(conn, "Fix login bug", "token expiry");
            let b = insert_task(conn, "Write report", "login stats");

            assert_eq!(SearchIndex::search(conn, "log")?, BTreeSet::from([a, b]));
            assert_eq!(SearchIndex::search(conn, "log tok")?, BTreeSet::from([a]));
            assert!(SearchIndex::search(conn, "deploy")?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn operator_syntax_in_input_is_literal() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            insert_task(conn, "alpha", "");
            // Unquoted, these would be FTS5 syntax errors or operators.
            assert!(SearchIndex::search(conn, "NOT alpha")?.is_empty());
            assert!(SearchIndex::search(conn, "title:alpha")?.is_empty());
            assert!(SearchIndex::search(conn, "alpha\"")?.len() <= 1);
            assert!(SearchIndex::search(conn, "(alpha")?.len() <= 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn reindex_replaces_stale_text() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let id = insert_task(conn, "Draft proposal", "");
            conn.execute("UPDATE tasks SET title = 'Send invoice' WHERE id = ?1", [id])?;
            SearchIndex::reindex(conn, id)?;

            assert!(SearchIndex::search(conn, "proposal")?.is_empty());
            assert_eq!(SearchIndex::search(conn, "invo")?, BTreeSet::from([id]));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn remove_drops_entry() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let id = insert_task(conn, "Archive mail", "");
            SearchIndex::remove(conn, id)?;
            assert!(SearchIndex::search(conn, "archive")?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn rebuild_covers_every_task() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, priority, due_date) VALUES ('Unindexed row', 'Low', '2026-01-01')",
                [],
            )?;
            assert!(SearchIndex::search(conn, "unindexed")?.is_empty());
            assert_eq!(SearchIndex::rebuild(conn)?, 1);
            assert_eq!(SearchIndex::search(conn, "unindexed")?.len(), 1);
            Ok(())
        })
        .unwrap();
    }
}
