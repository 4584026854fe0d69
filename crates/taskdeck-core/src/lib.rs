//! # taskdeck-core
//!
//! Domain types shared by every taskdeck crate: tasks, subtasks, tags,
//! suggestions, extracted drafts, and the request shapes accepted at the
//! boundary. Nothing in here touches storage or the clock.

#![deny(unsafe_code)]

pub mod draft;
pub mod errors;
pub mod insights;
pub mod subtask;
pub mod suggestion;
pub mod tag;
pub mod task;

pub use draft::{ParseRequest, TaskDraft};
pub use errors::ValidationError;
pub use insights::{InsightsSummary, PriorityCount};
pub use subtask::{
    CreateSubtaskRequest, NewSubtask, Subtask, SubtaskPatch, SubtaskStatus, UpdateSubtaskRequest,
};
pub use suggestion::{Suggestion, SuggestionKind, SuggestionRecord};
pub use tag::{Tag, TagInput};
pub use task::{
    BulkDeleteRequest, BulkDeleteResult, BulkPatch, BulkUpdateRequest, BulkUpdateResult,
    BulkUpdates, CreateTaskRequest, NewTask, Priority, ReorderRequest, Task, TaskFilter,
    TaskPatch, TaskQuery, TaskStatus, UpdateTaskRequest,
};
