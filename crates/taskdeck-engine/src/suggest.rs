//! Heuristic suggestions over the current task list.
//!
//! Per-task rules run in task order, then the workload rule; the result is
//! cut to [`MAX_SUGGESTIONS`] by position, not by confidence.

use chrono::{DateTime, Days, NaiveDate, Utc};

use taskdeck_core::{Priority, Suggestion, SuggestionKind, Task, TaskStatus};

pub const MAX_SUGGESTIONS: usize = 8;

/// Non-done task count at which the workload suggestion is added.
pub const WORKLOAD_THRESHOLD: usize = 8;

const DUE_SOON_DAYS: u64 = 3;
const MIN_DESCRIPTION_CHARS: usize = 10;

pub fn build_suggestions(tasks: &[Task]) -> Vec<Suggestion> {
    build_suggestions_at(tasks, Utc::now().date_naive())
}

/// Build suggestions treating `today` as the current date.
pub fn build_suggestions_at(tasks: &[Task], today: NaiveDate) -> Vec<Suggestion> {
    let horizon = today
        .checked_add_days(Days::new(DUE_SOON_DAYS))
        .unwrap_or(NaiveDate::MAX);
    let mut suggestions = Vec::new();

    for task in tasks {
        if task.status != TaskStatus::Done {
            if let Some(due) = parse_due(&task.due_date) {
                if due <= horizon {
                    suggestions.push(Suggestion {
                        kind: SuggestionKind::DueSoon,
                        title: format!("\"{}\" is due soon", task.title),
                        details: format!(
                            "Consider scheduling focus time. Due date: {}.",
                            task.due_date
                        ),
                        confidence: 0.72,
                    });
                }
            }
        }

        if task.priority == Priority::High && task.status == TaskStatus::Open {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Priority,
                title: format!("High priority task \"{}\" is still open", task.title),
                details: "Move it forward or break it into subtasks.".to_string(),
                confidence: 0.6,
            });
        }

        if task.description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            suggestions.push(Suggestion {
                kind: SuggestionKind::MissingContext,
                title: format!("Add context to \"{}\"", task.title),
                details: "A short description helps keep clarity during execution.".to_string(),
                confidence: 0.45,
            });
        }
    }

    let open = tasks.iter().filter(|t| t.status != TaskStatus::Done).count();
    if open >= WORKLOAD_THRESHOLD {
        suggestions.push(Suggestion {
            kind: SuggestionKind::Workload,
            title: "Backlog is growing".to_string(),
            details: "Consider closing, delegating, or deferring a few tasks.".to_string(),
            confidence: 0.55,
        });
    }

    // TODO: rank by confidence before cutting once callers can opt in;
    // today the first generated suggestions win.
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp. Anything else is skipped.
fn parse_due(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn task(id: i64, priority: Priority, status: TaskStatus, due: &str, description: &str) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: description.to_string(),
            priority,
            due_date: due.to_string(),
            status,
            position: id,
            tags: Vec::new(),
            subtask_count: 0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    const CONTEXT: &str = "plenty of written context";

    fn kinds(suggestions: &[Suggestion]) -> Vec<SuggestionKind> {
        suggestions.iter().map(|s| s.kind).collect()
    }

    #[test]
    fn busy_backlog_scenario() {
        let mut tasks = vec![task(1, Priority::High, TaskStatus::Open, "2026-06-03", CONTEXT)];
        for id in 2..=9 {
            tasks.push(task(id, Priority::Low, TaskStatus::Open, "2026-12-01", CONTEXT));
        }

        let out = build_suggestions_at(&tasks, today());
        assert!(out.len() <= MAX_SUGGESTIONS);
        assert_eq!(
            kinds(&out),
            vec![SuggestionKind::DueSoon, SuggestionKind::Priority, SuggestionKind::Workload]
        );
        assert_eq!(out[0].title, "\"task 1\" is due soon");
        assert_eq!(
            out[0].details,
            "Consider scheduling focus time. Due date: 2026-06-03."
        );
    }

    #[test]
    fn due_soon_includes_overdue_and_skips_done_and_garbage() {
        let tasks = vec![
            task(1, Priority::Low, TaskStatus::Open, "2026-05-01", CONTEXT),
            task(2, Priority::Low, TaskStatus::Done, "2026-06-02", CONTEXT),
            task(3, Priority::Low, TaskStatus::InProgress, "next week", CONTEXT),
            task(4, Priority::Low, TaskStatus::InProgress, "2026-06-04", CONTEXT),
            task(5, Priority::Low, TaskStatus::Open, "2026-06-05", CONTEXT),
            task(6, Priority::Low, TaskStatus::Open, "2026-06-02T09:00:00Z", CONTEXT),
        ];
        let due: Vec<i64> = build_suggestions_at(&tasks, today())
            .iter()
            .filter(|s| s.kind == SuggestionKind::DueSoon)
            .map(|s| {
                tasks
                    .iter()
                    .find(|t| s.title.contains(&t.title))
                    .map(|t| t.id)
                    .unwrap()
            })
            .collect();
        assert_eq!(due, vec![1, 4, 6]);
    }

    #[test]
    fn priority_rule_needs_open_status() {
        let tasks = vec![
            task(1, Priority::High, TaskStatus::InProgress, "2027-01-01", CONTEXT),
            task(2, Priority::High, TaskStatus::Open, "2027-01-01", CONTEXT),
        ];
        let out = build_suggestions_at(&tasks, today());
        assert_eq!(kinds(&out), vec![SuggestionKind::Priority]);
        assert!(out[0].title.contains("task 2"));
    }

    #[test]
    fn short_descriptions_need_context() {
        let tasks = vec![
            task(1, Priority::Low, TaskStatus::Done, "2027-01-01", "   short   "),
            task(2, Priority::Low, TaskStatus::Done, "2027-01-01", "0123456789"),
        ];
        let out = build_suggestions_at(&tasks, today());
        assert_eq!(kinds(&out), vec![SuggestionKind::MissingContext]);
        assert_eq!(out[0].title, "Add context to \"task 1\"");
        assert!((out[0].confidence - 0.45).abs() < f64::EPSILON);
    }

    #[test]
    fn truncation_is_positional() {
        // Each task yields three suggestions; the workload entry is cut.
        let tasks: Vec<Task> = (1..=9)
            .map(|id| task(id, Priority::High, TaskStatus::Open, "2026-06-01", ""))
            .collect();
        let out = build_suggestions_at(&tasks, today());
        assert_eq!(out.len(), MAX_SUGGESTIONS);
        assert_eq!(out[0].kind, SuggestionKind::DueSoon);
        assert!(out.iter().all(|s| s.kind != SuggestionKind::Workload));
        assert!(out[7].title.contains("task 3"));
    }

    #[test]
    fn empty_task_list_yields_nothing() {
        assert!(build_suggestions_at(&[], today()).is_empty());
    }
}
