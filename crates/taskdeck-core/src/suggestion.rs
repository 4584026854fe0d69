//! Advisory suggestions derived from the task list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed suggestion vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    DueSoon,
    Priority,
    MissingContext,
    Workload,
}

impl SuggestionKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::DueSoon => "due_soon",
            Self::Priority => "priority",
            Self::MissingContext => "missing_context",
            Self::Workload => "workload",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SuggestionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due_soon" => Ok(Self::DueSoon),
            "priority" => Ok(Self::Priority),
            "missing_context" => Ok(Self::MissingContext),
            "workload" => Ok(Self::Workload),
            other => Err(format!("unknown suggestion type: {other}")),
        }
    }
}

/// A generated suggestion. `confidence` is in `[0, 1]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub details: String,
    pub confidence: f64,
}

/// A suggestion as persisted in the append-only log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub details: String,
    pub confidence: f64,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_sql_label() {
        for kind in [
            SuggestionKind::DueSoon,
            SuggestionKind::Priority,
            SuggestionKind::MissingContext,
            SuggestionKind::Workload,
        ] {
            assert_eq!(kind.as_sql().parse::<SuggestionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn serializes_kind_under_type_key() {
        let s = Suggestion {
            kind: SuggestionKind::MissingContext,
            title: "t".into(),
            details: "d".into(),
            confidence: 0.45,
        };
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "missing_context");
    }
}
