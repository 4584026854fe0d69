//! Ordered checklist items owned by a task.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubtaskStatus {
    #[default]
    Open,
    Done,
}

impl SubtaskStatus {
    const LABELS: [&'static str; 2] = ["Open", "Done"];

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for SubtaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SubtaskStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown subtask status: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub title: String,
    pub status: SubtaskStatus,
    pub position: i64,
    pub created_at: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateSubtaskRequest {
    pub title: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSubtask {
    pub title: String,
}

impl CreateSubtaskRequest {
    pub fn validate(&self) -> Result<NewSubtask, ValidationError> {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => Ok(NewSubtask {
                title: title.to_string(),
            }),
            _ => Err(ValidationError::required("title")),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateSubtaskRequest {
    pub title: Option<String>,
    pub status: Option<String>,
    pub position: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub status: Option<SubtaskStatus>,
    pub position: Option<i64>,
}

impl UpdateSubtaskRequest {
    pub fn validate(&self) -> Result<SubtaskPatch, ValidationError> {
        let title = match self.title.as_deref().map(str::trim) {
            None => None,
            Some("") => return Err(ValidationError::required("title")),
            Some(title) => Some(title.to_string()),
        };
        let status = self
            .status
            .as_deref()
            .map(|raw| {
                raw.parse::<SubtaskStatus>()
                    .map_err(|_| ValidationError::invalid_choice("status", raw, &SubtaskStatus::LABELS))
            })
            .transpose()?;

        Ok(SubtaskPatch {
            title,
            status,
            position: self.position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_blank_title() {
        let req = CreateSubtaskRequest {
            title: Some("   ".into()),
        };
        assert_eq!(req.validate().unwrap_err().field, "title");
        assert!(CreateSubtaskRequest::default().validate().is_err());
    }

    #[test]
    fn update_rejects_in_progress_status() {
        let req = UpdateSubtaskRequest {
            status: Some("In Progress".into()),
            ..Default::default()
        };
        let err = req.validate().unwrap_err();
        assert_eq!(err.field, "status");
        assert!(err.message.contains("Open, Done"));
    }

    #[test]
    fn update_parses_status_and_title() {
        let patch = UpdateSubtaskRequest {
            title: Some(" check tokens ".into()),
            status: Some("done".into()),
            position: None,
        }
        .validate()
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("check tokens"));
        assert_eq!(patch.status, Some(SubtaskStatus::Done));
    }
}
