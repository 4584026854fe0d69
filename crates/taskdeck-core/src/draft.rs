use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::task::{Priority, TaskStatus};

/// `{text}` payload for extraction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParseRequest {
    pub text: Option<String>,
}

impl ParseRequest {
    /// The text to extract from; blank input is rejected.
    pub fn validate(&self) -> Result<&str, ValidationError> {
        match self.text.as_deref() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ValidationError::required("text")),
        }
    }
}

/// Structured fields pulled out of free text. Never persisted directly.
///
/// `due_date` is empty when the text carried no recognisable date; callers
/// must supply one before creating a task from the draft.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub due_date: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub subtasks: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_request_rejects_blank_text() {
        let blank = ParseRequest {
            text: Some(" \n ".into()),
        };
        assert_eq!(blank.validate().unwrap_err().field, "text");
        assert!(ParseRequest::default().validate().is_err());

        let note = ParseRequest {
            text: Some("Buy milk".into()),
        };
        assert_eq!(note.validate().unwrap(), "Buy milk");
    }

    #[test]
    fn draft_serializes_stored_labels() {
        let json = serde_json::to_value(TaskDraft {
            status: TaskStatus::InProgress,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(json["status"], "In Progress");
        assert_eq!(json["priority"], "Medium");
        assert_eq!(json["due_date"], "");
    }
}
