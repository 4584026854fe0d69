//! Settings type definitions.
//!
//! Field names are camelCase on disk. Every section is `#[serde(default)]`,
//! so a settings file only needs the keys it changes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "database": { "path": "/srv/taskdeck/tasks.db" },
///   "logging": { "level": "debug", "moduleLevels": { "taskdeck_store": "trace" } },
///   "suggestions": { "historyLimit": 50 }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskdeckSettings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    pub suggestions: SuggestionSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file. Relative paths resolve against the taskdeck home directory.
    pub path: String,
    /// How long a writer waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "tasks.db".to_string(),
            busy_timeout_ms: 5000,
        }
    }
}

impl DatabaseSettings {
    /// The database path with relative values anchored at `home`.
    pub fn resolve_path(&self, home: &Path) -> PathBuf {
        let path = PathBuf::from(&self.path);
        if path.is_absolute() {
            path
        } else {
            home.join(path)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter level (`error`, `warn`, `info`, `debug`, `trace`).
    pub level: String,
    /// Emit JSON lines instead of the compact human format.
    pub json: bool,
    /// Per-target level overrides, e.g. `{"taskdeck_store": "debug"}`.
    pub module_levels: BTreeMap<String, String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            module_levels: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionSettings {
    /// Entries returned by the suggestion history.
    pub history_limit: u32,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self { history_limit: 20 }
    }
}
