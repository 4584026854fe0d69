//! Task entity, its enums, and the request shapes that mutate or query it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::tag::TagInput;

// ─────────────────────────────────────────────────────────────────────────────
// Enums
// ─────────────────────────────────────────────────────────────────────────────

/// Task priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    const LABELS: [&'static str; 3] = ["Low", "Medium", "High"];

    /// Stored representation.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Parse an optional request field, treating blank as absent.
    pub fn parse_field(
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ValidationError::invalid_choice(field, value, &Self::LABELS)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Priority {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// Task lifecycle status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Done,
}

impl TaskStatus {
    const LABELS: [&'static str; 3] = ["Open", "In Progress", "Done"];

    /// Stored representation. Matches the labels older databases hold.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Parse an optional request field, treating blank as absent.
    pub fn parse_field(
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<Option<Self>, ValidationError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| ValidationError::invalid_choice(field, value, &Self::LABELS)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for TaskStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in progress" | "inprogress" | "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entity
// ─────────────────────────────────────────────────────────────────────────────

/// A task as returned by read paths, annotated with its tags and subtask count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub status: TaskStatus,
    pub position: i64,
    pub tags: Vec<String>,
    pub subtask_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Create
// ─────────────────────────────────────────────────────────────────────────────

/// Raw create payload.
///
/// `status` is accepted for shape compatibility but ignored: new tasks
/// always start `Open`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub tags: Option<TagInput>,
    pub status: Option<String>,
}

/// A validated create payload.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub tags: Option<TagInput>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<NewTask, ValidationError> {
        let title = required_text("title", self.title.as_deref())?;
        let priority = Priority::parse_field("priority", self.priority.as_deref())?
            .ok_or_else(|| ValidationError::required("priority"))?;
        let due_date = required_text("due_date", self.due_date.as_deref())?;

        Ok(NewTask {
            title,
            description: self.description.clone().unwrap_or_default(),
            priority,
            due_date,
            tags: self.tags.clone(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update
// ─────────────────────────────────────────────────────────────────────────────

/// Raw partial update. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub tags: Option<TagInput>,
}

/// A validated partial update.
///
/// `tags: Some(..)` replaces the whole association set, including with an
/// empty one; `None` leaves associations alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
    pub status: Option<TaskStatus>,
    pub tags: Option<TagInput>,
}

impl TaskPatch {
    /// True when the patch changes indexed text.
    pub fn touches_search_text(&self) -> bool {
        self.title.is_some() || self.description.is_some()
    }
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<TaskPatch, ValidationError> {
        // Title and due date may be omitted but never blanked.
        let title = self
            .title
            .as_deref()
            .map(|t| required_text("title", Some(t)))
            .transpose()?;
        let due_date = self
            .due_date
            .as_deref()
            .map(|d| required_text("due_date", Some(d)))
            .transpose()?;

        let priority = match self.priority.as_deref() {
            None => None,
            Some(raw) => Some(
                Priority::parse_field("priority", Some(raw))?
                    .ok_or_else(|| ValidationError::required("priority"))?,
            ),
        };
        let status = match self.status.as_deref() {
            None => None,
            Some(raw) => Some(
                TaskStatus::parse_field("status", Some(raw))?
                    .ok_or_else(|| ValidationError::required("status"))?,
            ),
        };

        Ok(TaskPatch {
            title,
            description: self.description.clone(),
            priority,
            due_date,
            status,
            tags: self.tags.clone(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────────────────────

/// Raw list filter (`status`, `priority`, `q`). Blank values mean "no filter".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub q: Option<String>,
}

/// A validated list filter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub text: Option<String>,
}

impl TaskFilter {
    pub fn validate(&self) -> Result<TaskQuery, ValidationError> {
        Ok(TaskQuery {
            status: TaskStatus::parse_field("status", self.status.as_deref())?,
            priority: Priority::parse_field("priority", self.priority.as_deref())?,
            text: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bulk operations
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BulkUpdates {
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// `{ids, updates: {status?, priority?}}`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<i64>,
    #[serde(default)]
    pub updates: BulkUpdates,
}

/// A validated bulk update; at least one field is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BulkPatch {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl BulkUpdateRequest {
    pub fn validate(&self) -> Result<BulkPatch, ValidationError> {
        if self.ids.is_empty() {
            return Err(ValidationError::new("ids", "must not be empty"));
        }
        let patch = BulkPatch {
            status: TaskStatus::parse_field("status", self.updates.status.as_deref())?,
            priority: Priority::parse_field("priority", self.updates.priority.as_deref())?,
        };
        if patch.status.is_none() && patch.priority.is_none() {
            return Err(ValidationError::new(
                "updates",
                "provide status or priority to update",
            ));
        }
        Ok(patch)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateResult {
    #[serde(rename = "updatedCount")]
    pub updated_count: usize,
}

/// `{ids}`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<i64>,
}

impl BulkDeleteRequest {
    pub fn validate(&self) -> Result<&[i64], ValidationError> {
        if self.ids.is_empty() {
            return Err(ValidationError::new("ids", "must not be empty"));
        }
        Ok(&self.ids)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDeleteResult {
    #[serde(rename = "deletedCount")]
    pub deleted_count: usize,
}

/// `{orderedIds}`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReorderRequest {
    #[serde(rename = "orderedIds")]
    pub ordered_ids: Vec<i64>,
}

impl ReorderRequest {
    pub fn validate(&self) -> Result<&[i64], ValidationError> {
        if self.ordered_ids.is_empty() {
            return Err(ValidationError::new("orderedIds", "must not be empty"));
        }
        Ok(&self.ordered_ids)
    }
}

fn required_text(field: &'static str, raw: Option<&str>) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::required(field)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn create(title: &str, priority: &str, due: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: Some(title.into()),
            priority: Some(priority.into()),
            due_date: Some(due.into()),
            ..Default::default()
        }
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Low ".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn status_accepts_legacy_and_enum_spellings() {
        assert_eq!("In Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("InProgress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::InProgress.as_sql(), "In Progress");
    }

    #[test]
    fn status_serializes_with_stored_label() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn create_requires_title_priority_and_due_date() {
        assert!(create("Write report", "High", "2026-01-10").validate().is_ok());

        let err = create("  ", "High", "2026-01-10").validate().unwrap_err();
        assert_eq!(err.field, "title");

        let mut missing_priority = create("x", "High", "2026-01-10");
        missing_priority.priority = None;
        assert_eq!(missing_priority.validate().unwrap_err().field, "priority");

        let err = create("x", "High", "").validate().unwrap_err();
        assert_eq!(err.field, "due_date");
    }

    #[test]
    fn create_rejects_out_of_enum_priority() {
        let err = create("x", "Critical", "2026-01-10").validate().unwrap_err();
        assert_eq!(err.field, "priority");
    }

    #[test]
    fn create_defaults_description_to_empty() {
        let task = create("x", "Low", "2026-01-10").validate().unwrap();
        assert_eq!(task.description, "");
        assert_eq!(task.priority, Priority::Low);
    }

    #[test]
    fn update_rejects_blank_title_and_due_date() {
        let blank_due = UpdateTaskRequest {
            due_date: Some(String::new()),
            ..Default::default()
        };
        assert_matches!(blank_due.validate(), Err(ValidationError { field: "due_date", .. }));

        let blank_title = UpdateTaskRequest {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert_matches!(blank_title.validate(), Err(ValidationError { field: "title", .. }));
    }

    #[test]
    fn update_allows_clearing_description() {
        let patch = UpdateTaskRequest {
            description: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.description.as_deref(), Some(""));
        assert!(patch.touches_search_text());
    }

    #[test]
    fn update_rejects_blank_status() {
        let req = UpdateTaskRequest {
            status: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap_err().field, "status");
    }

    #[test]
    fn filter_treats_blank_as_absent() {
        let query = TaskFilter {
            status: Some(String::new()),
            priority: Some("high".into()),
            q: Some("   ".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(query.status, None);
        assert_eq!(query.priority, Some(Priority::High));
        assert_eq!(query.text, None);
    }

    #[test]
    fn bulk_update_validates_before_use() {
        let req = BulkUpdateRequest {
            ids: vec![1, 2],
            updates: BulkUpdates {
                status: Some("Finished".into()),
                priority: None,
            },
        };
        assert_eq!(req.validate().unwrap_err().field, "status");

        let empty = BulkUpdateRequest {
            ids: vec![1],
            updates: BulkUpdates::default(),
        };
        assert_eq!(empty.validate().unwrap_err().field, "updates");

        let no_ids = BulkUpdateRequest {
            ids: vec![],
            updates: BulkUpdates {
                status: Some("Done".into()),
                priority: None,
            },
        };
        assert_eq!(no_ids.validate().unwrap_err().field, "ids");
    }

    #[test]
    fn reorder_request_uses_camel_case_key() {
        let req: ReorderRequest = serde_json::from_str(r#"{"orderedIds":[3,1,2]}"#).unwrap();
        assert_eq!(req.validate().unwrap(), &[3, 1, 2]);
        assert!(ReorderRequest::default().validate().is_err());
    }

    #[test]
    fn bulk_results_use_camel_case_keys() {
        let json = serde_json::to_value(BulkUpdateResult { updated_count: 2 }).unwrap();
        assert_eq!(json["updatedCount"], 2);
        let json = serde_json::to_value(BulkDeleteResult { deleted_count: 1 }).unwrap();
        assert_eq!(json["deletedCount"], 1);
    }
}
