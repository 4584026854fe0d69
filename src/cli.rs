//! Command-line surface. Every command prints one JSON document on stdout.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};

use taskdeck_core::{
    BulkDeleteRequest, BulkUpdateRequest, BulkUpdates, CreateSubtaskRequest, CreateTaskRequest,
    ParseRequest, ReorderRequest, TagInput, TaskFilter, UpdateSubtaskRequest, UpdateTaskRequest,
};
use taskdeck_store::StoreError;

use crate::app::TaskDeck;

/// Personal task tracker.
#[derive(Parser, Debug)]
#[command(name = "taskdeck", about = "Personal task tracker", version)]
pub struct Cli {
    /// Path to the `SQLite` database (overrides settings).
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Settings file (defaults to `~/.taskdeck/settings.json`).
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a task.
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Low, Medium, or High.
        #[arg(long)]
        priority: Option<String>,
        /// Due date, e.g. 2026-03-01.
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated tag names.
        #[arg(long)]
        tags: Option<String>,
    },
    /// List tasks, optionally filtered.
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Full-text search terms (prefix match, all terms required).
        #[arg(long, short)]
        q: Option<String>,
    },
    /// Show one task.
    Show { id: i64 },
    /// Change fields of a task. Omitted flags are left alone.
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Replace all tags; an empty string clears them.
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete a task with its subtasks and tag links.
    Delete { id: i64 },
    /// Set status and/or priority on several tasks at once.
    BulkUpdate {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Delete several tasks at once.
    BulkDelete {
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
    },
    /// Assign positions 1..n in the given order.
    Reorder {
        #[arg(value_delimiter = ',', required = true)]
        ids: Vec<i64>,
    },
    /// Subtask operations.
    #[command(subcommand)]
    Subtask(SubtaskCommand),
    /// List every known tag.
    Tags,
    /// Extract a task draft from free text (reads stdin when TEXT is omitted).
    Parse { text: Option<String> },
    /// Generate suggestions and record them in the history.
    Suggest,
    /// Recently generated suggestions, newest first.
    History {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Open/due-soon counts and a one-line summary.
    Insights,
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommand {
    List {
        task_id: i64,
    },
    Add {
        task_id: i64,
        title: String,
    },
    Update {
        task_id: i64,
        subtask_id: i64,
        #[arg(long)]
        title: Option<String>,
        /// Open or Done.
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        position: Option<i64>,
    },
    Delete {
        task_id: i64,
        subtask_id: i64,
    },
}

/// Run one command against `deck` and return its JSON result.
pub fn execute(deck: &TaskDeck, command: Command) -> Result<Value, StoreError> {
    match command {
        Command::Add {
            title,
            description,
            priority,
            due,
            tags,
        } => to_json(&deck.create_task(&CreateTaskRequest {
            title: Some(title),
            description,
            priority,
            due_date: due,
            tags: tags.map(TagInput::Delimited),
            status: None,
        })?),
        Command::List {
            status,
            priority,
            q,
        } => to_json(&deck.list_tasks(&TaskFilter {
            status,
            priority,
            q,
        })?),
        Command::Show { id } => to_json(&deck.get_task(id)?),
        Command::Update {
            id,
            title,
            description,
            priority,
            due,
            status,
            tags,
        } => to_json(&deck.update_task(
            id,
            &UpdateTaskRequest {
                title,
                description,
                priority,
                due_date: due,
                status,
                tags: tags.map(TagInput::Delimited),
            },
        )?),
        Command::Delete { id } => {
            deck.delete_task(id)?;
            Ok(success())
        }
        Command::BulkUpdate {
            ids,
            status,
            priority,
        } => to_json(&deck.bulk_update(&BulkUpdateRequest {
            ids,
            updates: BulkUpdates { status, priority },
        })?),
        Command::BulkDelete { ids } => to_json(&deck.bulk_delete(&BulkDeleteRequest { ids })?),
        Command::Reorder { ids } => {
            deck.reorder(&ReorderRequest { ordered_ids: ids })?;
            Ok(success())
        }
        Command::Subtask(sub) => execute_subtask(deck, sub),
        Command::Tags => to_json(&deck.list_tags()?),
        Command::Parse { text } => {
            let text = match text {
                Some(text) => text,
                None => std::io::read_to_string(std::io::stdin())
                    .map_err(|e| StoreError::Io(format!("read stdin: {e}")))?,
            };
            to_json(&deck.parse(&ParseRequest { text: Some(text) })?)
        }
        Command::Suggest => to_json(&deck.suggest()?),
        Command::History { limit } => match limit {
            Some(limit) => to_json(&deck.history_with_limit(limit)?),
            None => to_json(&deck.history()?),
        },
        Command::Insights => to_json(&deck.insights()?),
    }
}

fn execute_subtask(deck: &TaskDeck, command: SubtaskCommand) -> Result<Value, StoreError> {
    match command {
        SubtaskCommand::List { task_id } => to_json(&deck.list_subtasks(task_id)?),
        SubtaskCommand::Add { task_id, title } => to_json(&deck.create_subtask(
            task_id,
            &CreateSubtaskRequest { title: Some(title) },
        )?),
        SubtaskCommand::Update {
            task_id,
            subtask_id,
            title,
            status,
            position,
        } => to_json(&deck.update_subtask(
            task_id,
            subtask_id,
            &UpdateSubtaskRequest {
                title,
                status,
                position,
            },
        )?),
        SubtaskCommand::Delete {
            task_id,
            subtask_id,
        } => {
            deck.delete_subtask(task_id, subtask_id)?;
            Ok(success())
        }
    }
}

/// `{"error": {"kind", "message"}}` with storage detail withheld.
pub fn error_body(err: &StoreError) -> Value {
    json!({
        "error": {
            "kind": err.kind(),
            "message": err.client_message(),
        }
    })
}

/// Process exit status for a failed command.
pub fn exit_status(err: &StoreError) -> u8 {
    match err.kind() {
        "validation" => 2,
        "not_found" => 3,
        "conflict" => 4,
        _ => 1,
    }
}

fn success() -> Value {
    json!({ "success": true })
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Storage(format!("encode result: {e}")))
}
