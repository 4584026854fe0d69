//! Layered settings: compiled defaults, then the user's JSON file, then
//! `TASKDECK_*` variables. A file only needs the keys it changes.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::TaskdeckSettings;

/// `~/.taskdeck`, or `/tmp/.taskdeck` when `HOME` is unset.
pub fn taskdeck_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".taskdeck")
}

/// Resolve the path to the settings file (`~/.taskdeck/settings.json`).
pub fn settings_path() -> PathBuf {
    taskdeck_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<TaskdeckSettings> {
    load_settings_from_path(&settings_path())
}

/// `path` layered over defaults, then env overrides. No file means defaults.
pub fn load_settings_from_path(path: &Path) -> Result<TaskdeckSettings> {
    let mut layered = serde_json::to_value(TaskdeckSettings::default())?;

    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), "applying settings file");
            let file: Value = serde_json::from_str(&content)?;
            layered = deep_merge(layered, file);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file");
        }
        Err(e) => return Err(e.into()),
    }

    let mut settings: TaskdeckSettings = serde_json::from_value(layered)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Overlay `source` on `target`. Objects merge key by key; `null` in
/// `source` keeps the target value; anything else replaces it.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay.into_iter().filter(|(_, v)| !v.is_null()) {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                let _ = base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Apply `TASKDECK_*` overrides from the process environment.
pub fn apply_env_overrides(settings: &mut TaskdeckSettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from any variable source.
///
/// Invalid values are ignored with a warning and the file/default value stays.
pub fn apply_overrides<F>(settings: &mut TaskdeckSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = read_string(&lookup, "TASKDECK_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = read_u32(&lookup, "TASKDECK_BUSY_TIMEOUT_MS", 0, 600_000) {
        settings.database.busy_timeout_ms = v;
    }
    if let Some(v) = read_string(&lookup, "TASKDECK_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_bool(&lookup, "TASKDECK_LOG_JSON") {
        settings.logging.json = v;
    }
    if let Some(v) = read_u32(&lookup, "TASKDECK_HISTORY_LIMIT", 1, 500) {
        settings.suggestions.history_limit = v;
    }
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within an inclusive range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Variable readers ────────────────────────────────────────────────────────

fn read_string<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<String> {
    lookup(name).filter(|v| !v.is_empty())
}

fn read_bool<F: Fn(&str) -> Option<String>>(lookup: &F, name: &str) -> Option<bool> {
    let val = lookup(name)?;
    let result = parse_bool(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_u32<F: Fn(&str) -> Option<String>>(
    lookup: &F,
    name: &str,
    min: u32,
    max: u32,
) -> Option<u32> {
    let val = lookup(name)?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        warn!(key = name, value = %val, min, max, "invalid integer env var, ignoring");
    }
    result
}
