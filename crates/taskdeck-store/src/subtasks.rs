//! Ordered checklist items scoped to a parent task.

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use taskdeck_core::{CreateSubtaskRequest, Subtask, UpdateSubtaskRequest, ValidationError};

use crate::database::Database;
use crate::error::StoreError;
use crate::now_iso;
use crate::row_helpers::{get, parse_enum};

const SELECT_SUBTASK: &str =
    "SELECT id, task_id, title, status, position, COALESCE(created_at, '') FROM subtasks";

#[derive(Clone)]
pub struct SubtaskRepo {
    db: Database,
}

impl SubtaskRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Subtasks of one task by position, then id.
    pub fn list(&self, task_id: i64) -> Result<Vec<Subtask>, StoreError> {
        self.db.with_conn(|conn| {
            ensure_task(conn, task_id)?;
            let mut stmt = conn.prepare(&format!(
                "{SELECT_SUBTASK} WHERE task_id = ?1 ORDER BY position ASC, id ASC"
            ))?;
            let mut rows = stmt.query([task_id])?;
            let mut subtasks = Vec::new();
            while let Some(row) = rows.next()? {
                subtasks.push(subtask_from_row(row)?);
            }
            Ok(subtasks)
        })
    }

    /// Append a subtask after its siblings.
    pub fn create(&self, task_id: i64, req: &CreateSubtaskRequest) -> Result<Subtask, StoreError> {
        let new = req.validate()?;
        let subtask = self.db.with_tx(|conn| {
            ensure_task(conn, task_id)?;
            let _ = conn.execute(
                "INSERT INTO subtasks (task_id, title, status, position, created_at)
                 VALUES (?1, ?2, 'Open',
                         (SELECT COALESCE(MAX(position), 0) + 1 FROM subtasks WHERE task_id = ?1),
                         ?3)",
                params![task_id, new.title, now_iso()],
            )?;
            fetch(conn, task_id, conn.last_insert_rowid())
        })?;
        debug!(task_id, subtask_id = subtask.id, "subtask created");
        Ok(subtask)
    }

    /// Partial update. Absence is detected from the affected-row count.
    pub fn update(
        &self,
        task_id: i64,
        subtask_id: i64,
        req: &UpdateSubtaskRequest,
    ) -> Result<Subtask, StoreError> {
        let patch = req.validate()?;

        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(title) = &patch.title {
            values.push(Box::new(title.clone()));
            sets.push(format!("title = ?{}", values.len()));
        }
        if let Some(status) = patch.status {
            values.push(Box::new(status.as_sql()));
            sets.push(format!("status = ?{}", values.len()));
        }
        if let Some(position) = patch.position {
            values.push(Box::new(position));
            sets.push(format!("position = ?{}", values.len()));
        }
        if sets.is_empty() {
            return Err(ValidationError::new("subtask", "provide title, status, or position").into());
        }
        values.push(Box::new(subtask_id));
        values.push(Box::new(task_id));
        let sql = format!(
            "UPDATE subtasks SET {} WHERE id = ?{} AND task_id = ?{}",
            sets.join(", "),
            values.len() - 1,
            values.len()
        );

        self.db.with_tx(|conn| {
            let bound: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
            if conn.execute(&sql, bound.as_slice())? == 0 {
                return Err(StoreError::subtask_not_found(subtask_id));
            }
            fetch(conn, task_id, subtask_id)
        })
    }

    pub fn delete(&self, task_id: i64, subtask_id: i64) -> Result<(), StoreError> {
        let removed = self.db.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM subtasks WHERE id = ?1 AND task_id = ?2",
                [subtask_id, task_id],
            )?)
        })?;
        if removed == 0 {
            return Err(StoreError::subtask_not_found(subtask_id));
        }
        debug!(task_id, subtask_id, "subtask deleted");
        Ok(())
    }
}

fn ensure_task(conn: &Connection, task_id: i64) -> Result<(), StoreError> {
    let exists = conn
        .query_row("SELECT 1 FROM tasks WHERE id = ?1", [task_id], |_| Ok(()))
        .optional()?;
    exists.ok_or_else(|| StoreError::task_not_found(task_id))
}

fn fetch(conn: &Connection, task_id: i64, subtask_id: i64) -> Result<Subtask, StoreError> {
    conn.query_row(
        &format!("{SELECT_SUBTASK} WHERE id = ?1 AND task_id = ?2"),
        [subtask_id, task_id],
        |row| Ok(subtask_from_row(row)),
    )
    .optional()?
    .transpose()?
    .ok_or_else(|| StoreError::subtask_not_found(subtask_id))
}

fn subtask_from_row(row: &Row<'_>) -> Result<Subtask, StoreError> {
    let status: String = get(row, 3, "subtasks", "status")?;
    Ok(Subtask {
        id: get(row, 0, "subtasks", "id")?,
        task_id: get(row, 1, "subtasks", "task_id")?,
        title: get(row, 2, "subtasks", "title")?,
        status: parse_enum(&status, "subtasks", "status")?,
        position: get(row, 4, "subtasks", "position")?,
        created_at: get(row, 5, "subtasks", "created_at")?,
    })
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::tasks::TaskRepo;
    use assert_matches::assert_matches;
    use taskdeck_core::{CreateTaskRequest, SubtaskStatus};

    fn setup() -> (SubtaskRepo, TaskRepo, i64) {
        let db = Database::in_memory().unwrap();
        let tasks = TaskRepo::new(db.clone());
        let task = tasks
            .create(&CreateTaskRequest {
                title: Some("Fix login bug".into()),
                priority: Some("High".into()),
                due_date: Some("2026-01-01".into()),
                ..Default::default()
            })
            .unwrap();
        (SubtaskRepo::new(db), tasks, task.id)
    }

    fn titled(title: &str) -> CreateSubtaskRequest {
        CreateSubtaskRequest {
            title: Some(title.into()),
        }
    }

    #[test]
    fn create_appends_in_order() {
        let (repo, tasks, task_id) = setup();
        let a = repo.create(task_id, &titled("check token expiry")).unwrap();
        let b = repo.create(task_id, &titled("check redirect")).unwrap();

        assert_eq!((a.position, b.position), (1, 2));
        assert_eq!(a.status, SubtaskStatus::Open);
        let listed: Vec<String> = repo.list(task_id).unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(listed, vec!["check token expiry", "check redirect"]);
        assert_eq!(tasks.get(task_id).unwrap().subtask_count, 2);
    }

    #[test]
    fn create_under_missing_task_is_not_found() {
        let (repo, _, _) = setup();
        assert_matches!(
            repo.create(999, &titled("x")),
            Err(StoreError::NotFound { entity: "Task", id: 999 })
        );
    }

    #[test]
    fn update_status_and_position() {
        let (repo, _, task_id) = setup();
        let a = repo.create(task_id, &titled("a")).unwrap();
        let b = repo.create(task_id, &titled("b")).unwrap();

        let done = repo
            .update(
                task_id,
                a.id,
                &UpdateSubtaskRequest {
                    status: Some("Done".into()),
                    position: Some(5),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(done.status, SubtaskStatus::Done);

        let order: Vec<i64> = repo.list(task_id).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(order, vec![b.id, a.id]);
    }

    #[test]
    fn update_rejects_empty_title_and_bad_status() {
        let (repo, _, task_id) = setup();
        let a = repo.create(task_id, &titled("a")).unwrap();

        let blank = UpdateSubtaskRequest {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert_matches!(repo.update(task_id, a.id, &blank), Err(StoreError::Validation(_)));

        let bad = UpdateSubtaskRequest {
            status: Some("In Progress".into()),
            ..Default::default()
        };
        assert_matches!(repo.update(task_id, a.id, &bad), Err(StoreError::Validation(_)));

        assert_matches!(
            repo.update(task_id, a.id, &UpdateSubtaskRequest::default()),
            Err(StoreError::Validation(_))
        );
    }

    #[test]
    fn update_and_delete_missing_subtask_are_not_found() {
        let (repo, _, task_id) = setup();
        let patch = UpdateSubtaskRequest {
            title: Some("x".into()),
            ..Default::default()
        };
        assert_matches!(
            repo.update(task_id, 77, &patch),
            Err(StoreError::NotFound { entity: "Subtask", id: 77 })
        );
        assert_matches!(repo.delete(task_id, 77), Err(StoreError::NotFound { .. }));
    }

    #[test]
    fn subtask_is_scoped_to_its_parent() {
        let (repo, tasks, task_id) = setup();
        let other = tasks
            .create(&CreateTaskRequest {
                title: Some("Other".into()),
                priority: Some("Low".into()),
                due_date: Some("2026-01-01".into()),
                ..Default::default()
            })
            .unwrap();
        let sub = repo.create(task_id, &titled("a")).unwrap();

        assert_matches!(repo.delete(other.id, sub.id), Err(StoreError::NotFound { .. }));
        repo.delete(task_id, sub.id).unwrap();
        assert!(repo.list(task_id).unwrap().is_empty());
    }
}
