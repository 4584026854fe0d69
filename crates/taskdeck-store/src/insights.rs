//! Aggregate counts over the current task set.

use chrono::{NaiveDate, Utc};

use taskdeck_core::{InsightsSummary, PriorityCount};

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{get, parse_enum};

/// Due within this many days of today (overdue included).
pub const DUE_SOON_DAYS: u32 = 3;

#[derive(Clone)]
pub struct InsightsRepo {
    db: Database,
}

impl InsightsRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn summary(&self) -> Result<InsightsSummary, StoreError> {
        self.summary_at(Utc::now().date_naive())
    }

    /// Summary as of `today`. Unparseable due dates never count as due soon.
    pub fn summary_at(&self, today: NaiveDate) -> Result<InsightsSummary, StoreError> {
        let today = today.format("%Y-%m-%d").to_string();
        let horizon = format!("+{DUE_SOON_DAYS} day");

        self.db.with_conn(|conn| {
            let open_tasks: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE status = 'Open'",
                [],
                |row| row.get(0),
            )?;
            let due_soon: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tasks
                 WHERE COALESCE(status, 'Open') != 'Done'
                   AND date(due_date) IS NOT NULL
                   AND date(due_date) <= date(?1, ?2)",
                [&today, &horizon],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(
                "SELECT priority, COUNT(*) FROM tasks
                 WHERE status = 'Open'
                 GROUP BY priority
                 ORDER BY CASE priority WHEN 'High' THEN 0 WHEN 'Medium' THEN 1 ELSE 2 END",
            )?;
            let mut rows = stmt.query([])?;
            let mut priority = Vec::new();
            while let Some(row) = rows.next()? {
                let label: String = get(row, 0, "tasks", "priority")?;
                priority.push(PriorityCount {
                    priority: parse_enum(&label, "tasks", "priority")?,
                    count: get(row, 1, "tasks", "priority")?,
                });
            }

            Ok(InsightsSummary::new(open_tasks, due_soon, priority))
        })
    }
}
