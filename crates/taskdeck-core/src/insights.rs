use serde::{Deserialize, Serialize};

use crate::task::Priority;

/// Open-task count for one priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

/// Aggregate counts over the current task set plus a one-line summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSummary {
    pub open_tasks: i64,
    pub due_soon: i64,
    pub priority: Vec<PriorityCount>,
    pub summary: String,
}

impl InsightsSummary {
    /// Assemble the summary sentence from the counts.
    pub fn new(open_tasks: i64, due_soon: i64, priority: Vec<PriorityCount>) -> Self {
        let mut summary = format!("You have {open_tasks} open tasks. ");
        if due_soon > 0 {
            summary.push_str(&format!("{due_soon} tasks are due soon! "));
        }
        if let Some(high) = priority.iter().find(|p| p.priority == Priority::High) {
            summary.push_str(&format!("High priority tasks: {}.", high.count));
        }
        Self {
            open_tasks,
            due_soon,
            priority,
            summary,
        }
    }
}
