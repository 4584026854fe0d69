use thiserror::Error;

/// Why a settings file could not be used. Bad env values never error;
/// they are skipped with a warning.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON, or a value of the wrong type for its key.
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;
