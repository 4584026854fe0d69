//! Append-only log of generated suggestions.

use rusqlite::params;
use tracing::debug;

use taskdeck_core::{Suggestion, SuggestionRecord};

use crate::database::Database;
use crate::error::StoreError;
use crate::now_iso;
use crate::row_helpers::{get, parse_enum};

#[derive(Clone)]
pub struct SuggestionLog {
    db: Database,
}

impl SuggestionLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record a batch of suggestions in one transaction. Returns how many were written.
    pub fn append(&self, suggestions: &[Suggestion]) -> Result<usize, StoreError> {
        if suggestions.is_empty() {
            return Ok(0);
        }
        let written = self.db.with_tx(|conn| {
            let now = now_iso();
            let mut stmt = conn.prepare_cached(
                "INSERT INTO ai_suggestions (type, title, details, confidence, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for s in suggestions {
                let _ = stmt.execute(params![s.kind.as_sql(), s.title, s.details, s.confidence, now])?;
            }
            Ok(suggestions.len())
        })?;
        debug!(written, "suggestions logged");
        Ok(written)
    }

    /// The `limit` most recent entries, newest first.
    pub fn recent(&self, limit: u32) -> Result<Vec<SuggestionRecord>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, type, title, details, confidence, COALESCE(created_at, '')
                 FROM ai_suggestions
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )?;
            let mut rows = stmt.query([limit])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                let kind: String = get(row, 1, "ai_suggestions", "type")?;
                records.push(SuggestionRecord {
                    id: get(row, 0, "ai_suggestions", "id")?,
                    kind: parse_enum(&kind, "ai_suggestions", "type")?,
                    title: get(row, 2, "ai_suggestions", "title")?,
                    details: get(row, 3, "ai_suggestions", "details")?,
                    confidence: get(row, 4, "ai_suggestions", "confidence")?,
                    created_at: get(row, 5, "ai_suggestions", "created_at")?,
                });
            }
            Ok(records)
        })
    }
}
