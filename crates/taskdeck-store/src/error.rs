use taskdeck_core::ValidationError;

/// Errors from store operations.
///
/// [`kind`](Self::kind) gives callers a stable classification; storage
/// detail stays in the `Display` output for logs and is replaced by a
/// generic message in [`client_message`](Self::client_message).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Storage(String),

    #[error("corrupt row in {table}.{column}: {detail}")]
    CorruptRow {
        table: &'static str,
        column: &'static str,
        detail: String,
    },

    #[error("IO error: {0}")]
    Io(String),
}

impl StoreError {
    pub fn task_not_found(id: i64) -> Self {
        Self::NotFound { entity: "Task", id }
    }

    pub fn subtask_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Subtask",
            id,
        }
    }

    /// Short classification string, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) | Self::CorruptRow { .. } | Self::Io(_) => "storage",
        }
    }

    /// Whether the caller can fix the request and retry.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound { .. } | Self::Conflict(_))
    }

    /// Message safe to hand back across the boundary.
    pub fn client_message(&self) -> String {
        if self.is_user_correctable() {
            self.to_string()
        } else {
            "storage failure".to_string()
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(code, _)
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::Conflict(e.to_string())
            }
            _ => StoreError::Storage(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = StoreError::task_not_found(42);
        assert_eq!(err.to_string(), "Task not found: 42");
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn validation_keeps_field_in_message() {
        let err = StoreError::from(ValidationError::required("due_date"));
        assert_eq!(err.kind(), "validation");
        assert_eq!(err.client_message(), "validation error: due_date: is required");
    }

    #[test]
    fn storage_detail_is_not_leaked() {
        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), "storage");
        assert!(err.to_string().contains("database error"));
        assert_eq!(err.client_message(), "storage failure");
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed: tags.name".to_string()),
        );
        let err = StoreError::from(sqlite_err);
        assert_eq!(err.kind(), "conflict");
    }
}
