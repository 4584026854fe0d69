//! Task repository: CRUD, filtered listing, bulk mutation, and reordering.
//!
//! Every write that touches `title` or `description` refreshes the search
//! index on the same transaction, so the two can never disagree.
//! Dynamic SQL is assembled only from [`TaskColumn`] names; caller values
//! always travel as bound parameters.

use std::collections::HashSet;
use std::fmt::Write as _;

use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row, Statement};
use tracing::debug;

use taskdeck_core::{
    BulkDeleteRequest, BulkDeleteResult, BulkUpdateRequest, BulkUpdateResult, CreateTaskRequest,
    ReorderRequest, Task, TaskFilter, UpdateTaskRequest,
};

use crate::database::Database;
use crate::error::StoreError;
use crate::now_iso;
use crate::row_helpers::{get, parse_enum};
use crate::search::SearchIndex;
use crate::tags::TagService;

const SELECT_TASK: &str = "SELECT
    t.id,
    t.title,
    COALESCE(t.description, ''),
    t.priority,
    t.due_date,
    COALESCE(t.status, 'Open'),
    t.position,
    COALESCE(t.created_at, ''),
    COALESCE(t.updated_at, t.created_at, ''),
    (SELECT COUNT(*) FROM subtasks s WHERE s.task_id = t.id)
  FROM tasks t";

/// Columns that dynamic filters and updates may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TaskColumn {
    Title,
    Description,
    Priority,
    DueDate,
    Status,
    UpdatedAt,
}

impl TaskColumn {
    fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Priority => "priority",
            Self::DueDate => "due_date",
            Self::Status => "status",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Parameterised `UPDATE tasks SET ... WHERE id = ?`.
#[derive(Default)]
struct UpdateBuilder {
    sets: Vec<String>,
    values: Vec<Box<dyn ToSql>>,
}

impl UpdateBuilder {
    fn set<V: ToSql + 'static>(&mut self, column: TaskColumn, value: V) {
        self.values.push(Box::new(value));
        self.sets
            .push(format!("{} = ?{}", column.name(), self.values.len()));
    }

    /// The id is always the last parameter.
    fn sql(&self) -> String {
        format!(
            "UPDATE tasks SET {} WHERE id = ?{}",
            self.sets.join(", "),
            self.values.len() + 1
        )
    }

    fn execute(&self, stmt: &mut Statement<'_>, id: i64) -> Result<usize, StoreError> {
        let mut bound: Vec<&dyn ToSql> = self.values.iter().map(Box::as_ref).collect();
        bound.push(&id);
        Ok(stmt.execute(bound.as_slice())?)
    }
}

/// Task repository over a shared [`Database`] handle.
#[derive(Clone)]
pub struct TaskRepo {
    db: Database,
}

impl TaskRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Single-task CRUD
    // ─────────────────────────────────────────────────────────────────────

    /// Create a task at the end of the list. Status always starts `Open`.
    pub fn create(&self, req: &CreateTaskRequest) -> Result<Task, StoreError> {
        let new = req.validate()?;
        let tags = new
            .tags
            .as_ref()
            .map(TagService::normalize)
            .unwrap_or_default();

        let task = self.db.with_tx(|conn| {
            let now = now_iso();
            let _ = conn.execute(
                "INSERT INTO tasks (title, description, priority, due_date, status, position, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 'Open',
                         (SELECT COALESCE(MAX(position), 0) + 1 FROM tasks), ?5, ?5)",
                params![new.title, new.description, new.priority.as_sql(), new.due_date, now],
            )?;
            let id = conn.last_insert_rowid();
            SearchIndex::upsert(conn, id, &new.title, &new.description)?;
            if !tags.is_empty() {
                let ids: Vec<i64> = TagService::upsert(conn, &tags)?
                    .into_iter()
                    .map(|t| t.id)
                    .collect();
                TagService::attach(conn, id, &ids)?;
            }
            fetch(conn, id)
        })?;

        debug!(task_id = task.id, position = task.position, "task created");
        Ok(task)
    }

    pub fn get(&self, id: i64) -> Result<Task, StoreError> {
        self.db.with_conn(|conn| fetch(conn, id))
    }

    /// Apply a partial update. Supplied `tags` replace the whole set.
    pub fn update(&self, id: i64, req: &UpdateTaskRequest) -> Result<Task, StoreError> {
        let patch = req.validate()?;
        let tags = patch.tags.as_ref().map(TagService::normalize);

        let mut builder = UpdateBuilder::default();
        if let Some(title) = &patch.title {
            builder.set(TaskColumn::Title, title.clone());
        }
        if let Some(description) = &patch.description {
            builder.set(TaskColumn::Description, description.clone());
        }
        if let Some(priority) = patch.priority {
            builder.set(TaskColumn::Priority, priority.as_sql());
        }
        if let Some(due_date) = &patch.due_date {
            builder.set(TaskColumn::DueDate, due_date.clone());
        }
        if let Some(status) = patch.status {
            builder.set(TaskColumn::Status, status.as_sql());
        }
        builder.set(TaskColumn::UpdatedAt, now_iso());

        let task = self.db.with_tx(|conn| {
            let mut stmt = conn.prepare(&builder.sql())?;
            if builder.execute(&mut stmt, id)? == 0 {
                return Err(StoreError::task_not_found(id));
            }
            if patch.touches_search_text() {
                SearchIndex::reindex(conn, id)?;
            }
            if let Some(names) = &tags {
                TagService::replace_all(conn, id, names)?;
            }
            fetch(conn, id)
        })?;

        debug!(task_id = id, reindexed = patch.touches_search_text(), "task updated");
        Ok(task)
    }

    /// Delete a task; subtasks and tag associations cascade.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.db.with_tx(|conn| {
            SearchIndex::remove(conn, id)?;
            let removed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
            if removed == 0 {
                return Err(StoreError::task_not_found(id));
            }
            Ok(())
        })?;
        debug!(task_id = id, "task deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Listing
    // ─────────────────────────────────────────────────────────────────────

    /// Tasks matching every supplied filter, by position then due date.
    ///
    /// A text query is answered by [`SearchIndex::search`] and intersected
    /// with the status and priority predicates. Nothing searchable in it
    /// means nothing matches.
    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let query = filter.validate()?;

        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(status) = query.status {
            values.push(Box::new(status.as_sql()));
            conditions.push(format!("t.{} = ?{}", TaskColumn::Status.name(), values.len()));
        }
        if let Some(priority) = query.priority {
            values.push(Box::new(priority.as_sql()));
            conditions.push(format!(
                "t.{} = ?{}",
                TaskColumn::Priority.name(),
                values.len()
            ));
        }

        let mut sql = String::from(SELECT_TASK);
        if !conditions.is_empty() {
            let _ = write!(sql, " WHERE {}", conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY t.position ASC, t.due_date ASC, t.id ASC");

        self.db.with_conn(|conn| {
            let matches = match &query.text {
                Some(text) => {
                    let ids = SearchIndex::search(conn, text)?;
                    if ids.is_empty() {
                        return Ok(Vec::new());
                    }
                    Some(ids)
                }
                None => None,
            };

            let mut tasks = select_tasks(conn, &sql, &values)?;
            if let Some(ids) = matches {
                tasks.retain(|t| ids.contains(&t.id));
            }
            annotate_tags(conn, &mut tasks)?;
            Ok(tasks)
        })
    }

    /// Every task, soonest due date first (ties by id). Input order for the
    /// suggestion rules, whose output is cut positionally.
    pub fn list_by_due_date(&self) -> Result<Vec<Task>, StoreError> {
        let sql = format!("{SELECT_TASK} ORDER BY t.due_date ASC, t.id ASC");
        self.db.with_conn(|conn| {
            let mut tasks = select_tasks(conn, &sql, &[])?;
            annotate_tags(conn, &mut tasks)?;
            Ok(tasks)
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bulk operations
    // ─────────────────────────────────────────────────────────────────────

    /// Set status and/or priority on every listed task in one transaction.
    /// Unknown ids are skipped and not counted.
    pub fn bulk_update(&self, req: &BulkUpdateRequest) -> Result<BulkUpdateResult, StoreError> {
        let patch = req.validate()?;
        let ids = distinct(&req.ids);

        let mut builder = UpdateBuilder::default();
        if let Some(status) = patch.status {
            builder.set(TaskColumn::Status, status.as_sql());
        }
        if let Some(priority) = patch.priority {
            builder.set(TaskColumn::Priority, priority.as_sql());
        }
        builder.set(TaskColumn::UpdatedAt, now_iso());

        let updated_count = self.db.with_tx(|conn| {
            let mut stmt = conn.prepare(&builder.sql())?;
            let mut changed = 0;
            for id in &ids {
                changed += builder.execute(&mut stmt, *id)?;
            }
            Ok(changed)
        })?;

        debug!(requested = ids.len(), updated_count, "bulk update");
        Ok(BulkUpdateResult { updated_count })
    }

    /// Delete every listed task in one transaction. Unknown ids count as zero.
    pub fn bulk_delete(&self, req: &BulkDeleteRequest) -> Result<BulkDeleteResult, StoreError> {
        let ids = distinct(req.validate()?);

        let deleted_count = self.db.with_tx(|conn| {
            let mut stmt = conn.prepare("DELETE FROM tasks WHERE id = ?1")?;
            let mut deleted = 0;
            for id in &ids {
                SearchIndex::remove(conn, *id)?;
                deleted += stmt.execute([id])?;
            }
            Ok(deleted)
        })?;

        debug!(requested = ids.len(), deleted_count, "bulk delete");
        Ok(BulkDeleteResult { deleted_count })
    }

    /// Assign `position = index + 1` in the given order, atomically.
    ///
    /// Tasks left out keep their old positions, which may tie with the new ones.
    pub fn reorder(&self, req: &ReorderRequest) -> Result<(), StoreError> {
        let ordered = req.validate()?;

        self.db.with_tx(|conn| {
            let now = now_iso();
            let mut stmt =
                conn.prepare("UPDATE tasks SET position = ?1, updated_at = ?2 WHERE id = ?3")?;
            for (idx, id) in ordered.iter().enumerate() {
                let position = i64::try_from(idx + 1)
                    .map_err(|e| StoreError::Storage(format!("position overflow: {e}")))?;
                let _ = stmt.execute(params![position, now, id])?;
            }
            Ok(())
        })?;

        debug!(count = ordered.len(), "tasks reordered");
        Ok(())
    }
}

/// Read one fully annotated task.
fn fetch(conn: &Connection, id: i64) -> Result<Task, StoreError> {
    let sql = format!("{SELECT_TASK} WHERE t.id = ?1");
    let task = conn
        .query_row(&sql, [id], |row| Ok(task_from_row(row)))
        .optional()?
        .transpose()?
        .ok_or_else(|| StoreError::task_not_found(id))?;

    let mut tasks = vec![task];
    annotate_tags(conn, &mut tasks)?;
    Ok(tasks.remove(0))
}

fn select_tasks(
    conn: &Connection,
    sql: &str,
    values: &[Box<dyn ToSql>],
) -> Result<Vec<Task>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let bound: Vec<&dyn ToSql> = values.iter().map(Box::as_ref).collect();
    let mut rows = stmt.query(bound.as_slice())?;
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        tasks.push(task_from_row(row)?);
    }
    Ok(tasks)
}

fn annotate_tags(conn: &Connection, tasks: &mut [Task]) -> Result<(), StoreError> {
    let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
    let mut resolved = TagService::resolve(conn, &ids)?;
    for task in tasks.iter_mut() {
        task.tags = resolved.remove(&task.id).unwrap_or_default();
    }
    Ok(())
}

fn task_from_row(row: &Row<'_>) -> Result<Task, StoreError> {
    let priority: String = get(row, 3, "tasks", "priority")?;
    let status: String = get(row, 5, "tasks", "status")?;
    Ok(Task {
        id: get(row, 0, "tasks", "id")?,
        title: get(row, 1, "tasks", "title")?,
        description: get(row, 2, "tasks", "description")?,
        priority: parse_enum(&priority, "tasks", "priority")?,
        due_date: get(row, 4, "tasks", "due_date")?,
        status: parse_enum(&status, "tasks", "status")?,
        position: get(row, 6, "tasks", "position")?,
        tags: Vec::new(),
        subtask_count: get(row, 9, "tasks", "subtask_count")?,
        created_at: get(row, 7, "tasks", "created_at")?,
        updated_at: get(row, 8, "tasks", "updated_at")?,
    })
}

/// First occurrence of each id, in input order.
fn distinct(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
