//! Tag normalisation, upsert, and the task ↔ tag association.
//!
//! Tags are global, case-preserving, and unique by name. They are created
//! lazily on first use and never deleted; only `task_tags` rows come and go.

use std::collections::{HashMap, HashSet};

use rusqlite::{params_from_iter, Connection};
use taskdeck_core::{Tag, TagInput};

use crate::error::StoreError;
use crate::row_helpers::{get, placeholders};

/// SQLite's default host-parameter limit is well above this.
const RESOLVE_CHUNK: usize = 500;

/// Stateless; every method takes the caller's `&Connection`.
pub struct TagService;

impl TagService {
    /// Trim, drop empties, and dedupe (exact match) keeping first-seen order.
    pub fn normalize(input: &TagInput) -> Vec<String> {
        Self::normalize_entries(input.raw_entries())
    }

    pub fn normalize_entries<'a, I>(entries: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.to_string()))
            .map(String::from)
            .collect()
    }

    /// Create any unknown names and return every tag in input order.
    ///
    /// `INSERT OR IGNORE` against the `UNIQUE(name)` constraint makes a
    /// concurrent creator of the same name a no-op instead of an error.
    pub fn upsert(conn: &Connection, names: &[String]) -> Result<Vec<Tag>, StoreError> {
        let mut insert = conn.prepare_cached("INSERT OR IGNORE INTO tags (name) VALUES (?1)")?;
        let mut select = conn.prepare_cached("SELECT id FROM tags WHERE name = ?1")?;
        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            let _ = insert.execute([name])?;
            let id: i64 = select.query_row([name], |row| row.get(0))?;
            tags.push(Tag {
                id,
                name: name.clone(),
            });
        }
        Ok(tags)
    }

    /// Associate tags with a task. Existing pairs are left as they are.
    pub fn attach(conn: &Connection, task_id: i64, tag_ids: &[i64]) -> Result<(), StoreError> {
        let mut stmt =
            conn.prepare_cached("INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?1, ?2)")?;
        for tag_id in tag_ids {
            let _ = stmt.execute([task_id, *tag_id])?;
        }
        Ok(())
    }

    /// Make `names` the task's complete tag set. An empty slice clears it.
    pub fn replace_all(conn: &Connection, task_id: i64, names: &[String]) -> Result<(), StoreError> {
        let _ = conn.execute("DELETE FROM task_tags WHERE task_id = ?1", [task_id])?;
        let tags = Self::upsert(conn, names)?;
        let ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
        Self::attach(conn, task_id, &ids)
    }

    /// Tag names per task in association order. Every requested id is present.
    pub fn resolve(
        conn: &Connection,
        task_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<String>>, StoreError> {
        let mut resolved: HashMap<i64, Vec<String>> =
            task_ids.iter().map(|id| (*id, Vec::new())).collect();

        for chunk in task_ids.chunks(RESOLVE_CHUNK) {
            let sql = format!(
                "SELECT tt.task_id, t.name
                 FROM task_tags tt
                 JOIN tags t ON t.id = tt.tag_id
                 WHERE tt.task_id IN ({})
                 ORDER BY tt.task_id, tt.rowid",
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                let task_id: i64 = get(row, 0, "task_tags", "task_id")?;
                let name: String = get(row, 1, "tags", "name")?;
                resolved.entry(task_id).or_default().push(name);
            }
        }
        Ok(resolved)
    }

    /// Every known tag, alphabetical (case-insensitive).
    pub fn list_all(conn: &Connection) -> Result<Vec<Tag>, StoreError> {
        let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY name COLLATE NOCASE, id")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(Tag {
                id: get(row, 0, "tags", "id")?,
                name: get(row, 1, "tags", "name")?,
            });
        }
        Ok(tags)
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::database::Database;
    use proptest::prelude::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn task(conn: &Connection, title: &str) -> i64 {
        conn.execute(
            "INSERT INTO tasks (title, priority, due_date) VALUES (?1, 'Medium', '2026-01-01')",
            [title],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn normalize_delimited_string() {
        let input = TagInput::from(" work, ,urgent,work , Work");
        assert_eq!(TagService::normalize(&input), names(&["work", "urgent", "Work"]));
    }

    #[test]
    fn normalize_list() {
        let input = TagInput::from(names(&["", "home", " home", "errands"]));
        assert_eq!(TagService::normalize(&input), names(&["home", "errands"]));
    }

    #[test]
    fn upsert_is_idempotent() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let first = TagService::upsert(conn, &names(&["work", "urgent"]))?;
            let second = TagService::upsert(conn, &names(&["urgent", "work"]))?;
            assert_eq!(first[0].id, second[1].id);
            assert_eq!(first[1].id, second[0].id);
            assert_eq!(TagService::list_all(conn)?.len(), 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn attach_ignores_duplicate_pairs() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let id = task(conn, "t");
            let tags = TagService::upsert(conn, &names(&["a"]))?;
            TagService::attach(conn, id, &[tags[0].id])?;
            TagService::attach(conn, id, &[tags[0].id])?;
            assert_eq!(TagService::resolve(conn, &[id])?[&id], names(&["a"]));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn replace_all_swaps_and_clears() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let id = task(conn, "t");
            TagService::replace_all(conn, id, &names(&["a", "b"]))?;
            TagService::replace_all(conn, id, &names(&["c", "a"]))?;
            assert_eq!(TagService::resolve(conn, &[id])?[&id], names(&["c", "a"]));

            TagService::replace_all(conn, id, &[])?;
            assert!(TagService::resolve(conn, &[id])?[&id].is_empty());

            // Detached tags are kept.
            assert_eq!(TagService::list_all(conn)?.len(), 3);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn resolve_includes_untagged_tasks() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let tagged = task(conn, "tagged");
            let bare = task(conn, "bare");
            TagService::replace_all(conn, tagged, &names(&["x"]))?;

            let map = TagService::resolve(conn, &[tagged, bare, 999])?;
            assert_eq!(map.len(), 3);
            assert_eq!(map[&tagged], names(&["x"]));
            assert!(map[&bare].is_empty());
            assert!(map[&999].is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn list_all_is_alphabetical_ignoring_case() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            TagService::upsert(conn, &names(&["beta", "Alpha", "gamma"]))?;
            let listed: Vec<String> = TagService::list_all(conn)?.into_iter().map(|t| t.name).collect();
            assert_eq!(listed, names(&["Alpha", "beta", "gamma"]));
            Ok(())
        })
        .unwrap();
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent_and_clean(raw in proptest::collection::vec("[ a-zA-Z,]{0,8}", 0..12)) {
            let once = TagService::normalize(&TagInput::List(raw));
            let twice = TagService::normalize(&TagInput::List(once.clone()));
            prop_assert_eq!(&once, &twice);

            let unique: HashSet<&String> = once.iter().collect();
            prop_assert_eq!(unique.len(), once.len());
            prop_assert!(once.iter().all(|t| !t.is_empty() && t.trim() == t));
        }
    }
}
