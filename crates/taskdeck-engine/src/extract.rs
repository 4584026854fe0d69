//! Rule-based extraction of task fields from a free-text note.
//!
//! Total over its input: anything unrecognised falls back to a default
//! (empty due date, `Medium`, `Open`) instead of failing. Keywords match
//! as case-insensitive substrings, so "urgently" counts as "urgent".

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{Days, NaiveDate, Utc};
use regex::Regex;
use tracing::debug;

use taskdeck_core::{Priority, TaskDraft, TaskStatus};

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)#([a-z0-9_-]+)").unwrap());

static HIGH_PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)asap|urgent|immediately|high priority|p1|critical").unwrap()
});
static LOW_PRIORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)low priority|p3|someday|nice to have").unwrap()
});

static DONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)done|completed|finished").unwrap());
static IN_PROGRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)in progress|started|ongoing").unwrap());

static TODAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)today").unwrap());
static TOMORROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)tomorrow").unwrap());
static IN_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)in (\d{1,2}) days?").unwrap());
static ON_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on (\d{4}-\d{2}-\d{2})").unwrap());
static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b").unwrap());

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*]\s+(.+)$").unwrap());

/// Extract a draft using today's UTC date for relative due dates.
pub fn extract(raw: &str) -> TaskDraft {
    extract_at(raw, Utc::now().date_naive())
}

/// Extract a draft, resolving "today", "tomorrow", and "in N days" against `today`.
pub fn extract_at(raw: &str, today: NaiveDate) -> TaskDraft {
    let text = raw.trim();
    let (title, description) = title_and_description(text);

    TaskDraft {
        title,
        description,
        tags: tags(text),
        due_date: due_date(text, today),
        priority: priority(text),
        status: status(text),
        subtasks: subtasks(text),
    }
}

fn title_and_description(text: &str) -> (String, String) {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let title = lines.next().unwrap_or_default().to_string();
    let description = lines.collect::<Vec<_>>().join("\n");
    (title, description)
}

/// Lowercased `#tags` in first-seen order.
fn tags(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TAG.captures_iter(text)
        .map(|cap| cap[1].to_lowercase())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// First matching rule wins; no match yields an empty string.
fn due_date(text: &str, today: NaiveDate) -> String {
    if TODAY.is_match(text) {
        return iso(today);
    }
    if TOMORROW.is_match(text) {
        return today.checked_add_days(Days::new(1)).map(iso).unwrap_or_default();
    }
    if let Some(cap) = IN_DAYS.captures(text) {
        if let Ok(n) = cap[1].parse::<u64>() {
            return today.checked_add_days(Days::new(n)).map(iso).unwrap_or_default();
        }
    }
    if let Some(cap) = ON_DATE.captures(text) {
        return cap[1].to_string();
    }
    if let Some(cap) = SLASH_DATE.captures(text) {
        let year = if cap[3].len() == 2 {
            format!("20{}", &cap[3])
        } else {
            cap[3].to_string()
        };
        let parsed = match (
            year.parse::<i32>(),
            cap[1].parse::<u32>(),
            cap[2].parse::<u32>(),
        ) {
            (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        };
        match parsed {
            Some(date) => return iso(date),
            None => debug!(matched = &cap[0], "ignoring impossible calendar date"),
        }
    }
    String::new()
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// High outranks Low when both signals appear.
fn priority(text: &str) -> Priority {
    if HIGH_PRIORITY.is_match(text) {
        Priority::High
    } else if LOW_PRIORITY.is_match(text) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

fn status(text: &str) -> TaskStatus {
    if DONE.is_match(text) {
        TaskStatus::Done
    } else if IN_PROGRESS.is_match(text) {
        TaskStatus::InProgress
    } else {
        TaskStatus::Open
    }
}

/// `- item` / `* item` lines, in order.
fn subtasks(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| BULLET.captures(line.trim()))
        .map(|cap| cap[1].trim().to_string())
        .collect()
}
