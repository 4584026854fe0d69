//! # taskdeck-store
//!
//! `SQLite` persistence for tasks, tags, subtasks, and the suggestion log,
//! plus the FTS5 search index kept in lockstep with task rows.
//!
//! [`Database::open`] migrates the schema before handing out a handle, so
//! every repository built from it sees a ready store. Multi-row mutations
//! run inside [`Database::with_tx`]; a failure rolls back everything.

#![deny(unsafe_code)]

pub mod database;
pub mod error;
pub mod insights;
pub mod row_helpers;
pub mod schema;
pub mod search;
pub mod subtasks;
pub mod suggestions;
pub mod tags;
pub mod tasks;

pub use database::{Database, StoreOptions};
pub use error::StoreError;
pub use insights::InsightsRepo;
pub use search::SearchIndex;
pub use subtasks::SubtaskRepo;
pub use suggestions::SuggestionLog;
pub use tags::TagService;
pub use tasks::TaskRepo;

/// Current UTC timestamp as ISO 8601.
pub(crate) fn now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
