//! Tag entity and the two input shapes callers may use to supply tags.

use serde::{Deserialize, Serialize};

/// A globally unique, case-preserving tag name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// Tags as supplied by a caller: either a comma-delimited string
/// (`"work, urgent"`) or a list (`["work", "urgent"]`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    Delimited(String),
    List(Vec<String>),
}

impl TagInput {
    /// Raw entries before trimming and deduplication.
    pub fn raw_entries(&self) -> Vec<&str> {
        match self {
            Self::Delimited(s) => s.split(',').collect(),
            Self::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl From<Vec<String>> for TagInput {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&str> for TagInput {
    fn from(s: &str) -> Self {
        Self::Delimited(s.to_string())
    }
}
