//! Application facade over the store and the rule engine.
//!
//! The engine is pure; the only side effect of producing suggestions is
//! the explicit [`SuggestionLog::append`] in [`TaskDeck::suggest_at`].
//! Storage failures are logged here before they reach the caller.

use std::path::Path;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error};

use taskdeck_core::{
    BulkDeleteRequest, BulkDeleteResult, BulkUpdateRequest, BulkUpdateResult,
    CreateSubtaskRequest, CreateTaskRequest, InsightsSummary, ParseRequest, ReorderRequest,
    Subtask, Suggestion, SuggestionRecord, Tag, Task, TaskDraft, TaskFilter,
    UpdateSubtaskRequest, UpdateTaskRequest,
};
use taskdeck_settings::TaskdeckSettings;
use taskdeck_store::{
    Database, InsightsRepo, StoreError, StoreOptions, SubtaskRepo, SuggestionLog, TagService,
    TaskRepo,
};

/// Every task operation, one handle.
#[derive(Clone)]
pub struct TaskDeck {
    db: Database,
    tasks: TaskRepo,
    subtasks: SubtaskRepo,
    log: SuggestionLog,
    insights: InsightsRepo,
    history_limit: u32,
}

impl TaskDeck {
    /// Open (and migrate) the database at `path` using `settings`.
    pub fn open(path: &Path, settings: &TaskdeckSettings) -> Result<Self, StoreError> {
        let options = StoreOptions {
            busy_timeout_ms: settings.database.busy_timeout_ms,
        };
        let db = logged("open", Database::open(path, &options))?;
        Ok(Self::from_database(db, settings.suggestions.history_limit))
    }

    /// In-memory deck with default settings.
    pub fn in_memory() -> Result<Self, StoreError> {
        let settings = TaskdeckSettings::default();
        let db = Database::in_memory()?;
        Ok(Self::from_database(db, settings.suggestions.history_limit))
    }

    pub fn from_database(db: Database, history_limit: u32) -> Self {
        Self {
            tasks: TaskRepo::new(db.clone()),
            subtasks: SubtaskRepo::new(db.clone()),
            log: SuggestionLog::new(db.clone()),
            insights: InsightsRepo::new(db.clone()),
            db,
            history_limit,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // ── Tasks ───────────────────────────────────────────────────────────

    pub fn create_task(&self, req: &CreateTaskRequest) -> Result<Task, StoreError> {
        logged("create_task", self.tasks.create(req))
    }

    pub fn get_task(&self, id: i64) -> Result<Task, StoreError> {
        logged("get_task", self.tasks.get(id))
    }

    pub fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        logged("list_tasks", self.tasks.list(filter))
    }

    pub fn update_task(&self, id: i64, req: &UpdateTaskRequest) -> Result<Task, StoreError> {
        logged("update_task", self.tasks.update(id, req))
    }

    pub fn delete_task(&self, id: i64) -> Result<(), StoreError> {
        logged("delete_task", self.tasks.delete(id))
    }

    pub fn bulk_update(&self, req: &BulkUpdateRequest) -> Result<BulkUpdateResult, StoreError> {
        logged("bulk_update", self.tasks.bulk_update(req))
    }

    pub fn bulk_delete(&self, req: &BulkDeleteRequest) -> Result<BulkDeleteResult, StoreError> {
        logged("bulk_delete", self.tasks.bulk_delete(req))
    }

    pub fn reorder(&self, req: &ReorderRequest) -> Result<(), StoreError> {
        logged("reorder", self.tasks.reorder(req))
    }

    // ── Subtasks ────────────────────────────────────────────────────────

    pub fn list_subtasks(&self, task_id: i64) -> Result<Vec<Subtask>, StoreError> {
        logged("list_subtasks", self.subtasks.list(task_id))
    }

    pub fn create_subtask(
        &self,
        task_id: i64,
        req: &CreateSubtaskRequest,
    ) -> Result<Subtask, StoreError> {
        logged("create_subtask", self.subtasks.create(task_id, req))
    }

    pub fn update_subtask(
        &self,
        task_id: i64,
        subtask_id: i64,
        req: &UpdateSubtaskRequest,
    ) -> Result<Subtask, StoreError> {
        logged(
            "update_subtask",
            self.subtasks.update(task_id, subtask_id, req),
        )
    }

    pub fn delete_subtask(&self, task_id: i64, subtask_id: i64) -> Result<(), StoreError> {
        logged("delete_subtask", self.subtasks.delete(task_id, subtask_id))
    }

    // ── Tags ────────────────────────────────────────────────────────────

    pub fn list_tags(&self) -> Result<Vec<Tag>, StoreError> {
        logged("list_tags", self.db.with_conn(TagService::list_all))
    }

    // ── Extraction & suggestions ────────────────────────────────────────

    /// Extract a draft from free text. Nothing is persisted.
    pub fn parse(&self, req: &ParseRequest) -> Result<TaskDraft, StoreError> {
        self.parse_at(req, Utc::now().date_naive())
    }

    pub fn parse_at(&self, req: &ParseRequest, today: NaiveDate) -> Result<TaskDraft, StoreError> {
        let text = req.validate()?;
        Ok(taskdeck_engine::extract_at(text, today))
    }

    /// Build suggestions for every task, soonest due first, and append them
    /// to the log.
    pub fn suggest(&self) -> Result<Vec<Suggestion>, StoreError> {
        self.suggest_at(Utc::now().date_naive())
    }

    pub fn suggest_at(&self, today: NaiveDate) -> Result<Vec<Suggestion>, StoreError> {
        // Due date order decides which suggestions survive the cut.
        let tasks = logged("suggest", self.tasks.list_by_due_date())?;
        let suggestions = taskdeck_engine::build_suggestions_at(&tasks, today);
        let logged_count = logged("suggest", self.log.append(&suggestions))?;
        debug!(tasks = tasks.len(), logged = logged_count, "suggestions generated");
        Ok(suggestions)
    }

    /// Most recent log entries, newest first, capped at the configured limit.
    pub fn history(&self) -> Result<Vec<SuggestionRecord>, StoreError> {
        self.history_with_limit(self.history_limit)
    }

    pub fn history_with_limit(&self, limit: u32) -> Result<Vec<SuggestionRecord>, StoreError> {
        logged("history", self.log.recent(limit))
    }

    pub fn insights(&self) -> Result<InsightsSummary, StoreError> {
        logged("insights", self.insights.summary())
    }

    pub fn insights_at(&self, today: NaiveDate) -> Result<InsightsSummary, StoreError> {
        logged("insights", self.insights.summary_at(today))
    }
}

/// Log storage-class failures; user-correctable errors pass through quietly.
fn logged<T>(operation: &'static str, result: Result<T, StoreError>) -> Result<T, StoreError> {
    if let Err(e) = &result {
        if !e.is_user_correctable() {
            error!(operation, kind = e.kind(), error = %e, "store operation failed");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn parse_rejects_blank_text() {
        let deck = TaskDeck::in_memory().unwrap();
        let err = deck
            .parse_at(&ParseRequest { text: Some("   ".into()) }, today())
            .unwrap_err();
        assert_matches!(err, StoreError::Validation(ref v) if v.field == "text");
    }

    #[test]
    fn parse_persists_nothing() {
        let deck = TaskDeck::in_memory().unwrap();
        let draft = deck
            .parse_at(&ParseRequest { text: Some("Pay rent tomorrow #home".into()) }, today())
            .unwrap();
        assert_eq!(draft.due_date, "2026-06-02");
        assert_eq!(draft.tags, vec!["home"]);
        assert!(deck.list_tasks(&TaskFilter::default()).unwrap().is_empty());
        assert!(deck.list_tags().unwrap().is_empty());
    }

    #[test]
    fn history_respects_configured_limit() {
        let db = Database::in_memory().unwrap();
        let deck = TaskDeck::from_database(db, 2);
        for n in 0..3 {
            deck.create_task(&CreateTaskRequest {
                title: Some(format!("task {n}")),
                priority: Some("Low".into()),
                due_date: Some("2030-01-01".into()),
                ..Default::default()
            })
            .unwrap();
        }
        let generated = deck.suggest_at(today()).unwrap();
        assert_eq!(generated.len(), 3);
        assert_eq!(deck.history().unwrap().len(), 2);
        assert_eq!(deck.history_with_limit(10).unwrap().len(), 3);
    }

    #[test]
    fn logged_passes_results_through() {
        assert_eq!(logged("noop", Ok::<_, StoreError>(7)).unwrap(), 7);
        let err = logged::<()>("noop", Err(StoreError::Storage("disk full".into()))).unwrap_err();
        assert_eq!(err.kind(), "storage");
    }
}
