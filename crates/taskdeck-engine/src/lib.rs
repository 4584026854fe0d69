//! # taskdeck-engine
//!
//! Pure transforms over text and task lists: [`extract`] turns a free-text
//! note into a [`TaskDraft`](taskdeck_core::TaskDraft), and
//! [`build_suggestions`] derives advisory suggestions from the current
//! tasks. Neither touches storage. Both read the clock only through their
//! default entry points; the `*_at` variants take "today" explicitly.

#![deny(unsafe_code)]

pub mod extract;
pub mod suggest;

pub use extract::{extract, extract_at};
pub use suggest::{build_suggestions, build_suggestions_at, MAX_SUGGESTIONS, WORKLOAD_THRESHOLD};
