//! # taskdeck-telemetry
//!
//! Installs the global `tracing` subscriber. Output goes to stderr so the
//! CLI can keep stdout for JSON results.

#![deny(unsafe_code)]

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Configuration for the telemetry subsystem.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default log level. Overridden by the `RUST_LOG` env var.
    pub log_level: Level,
    /// Per-module level overrides (e.g. "taskdeck_store" => DEBUG).
    pub module_levels: Vec<(String, Level)>,
    /// JSON lines instead of the compact human format.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::WARN,
            module_levels: Vec::new(),
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Build from textual levels. Unknown level names fall back to the
    /// default level (root) or are dropped (module overrides).
    pub fn from_names<'a, I>(level: &str, module_levels: I, json: bool) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let defaults = Self::default();
        Self {
            log_level: parse_level(level).unwrap_or(defaults.log_level),
            module_levels: module_levels
                .into_iter()
                .filter_map(|(module, lvl)| parse_level(lvl).map(|l| (module.to_string(), l)))
                .collect(),
            json,
        }
    }

    /// `EnvFilter` directive string, e.g. `warn,taskdeck_store=debug`.
    pub fn filter_directives(&self) -> String {
        let mut directives = level_name(self.log_level);
        for (module, level) in &self.module_levels {
            directives.push_str(&format!(",{module}={}", level_name(*level)));
        }
        directives
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Install the global subscriber. Call once at startup.
///
/// `RUST_LOG`, when set and valid, replaces the configured directives.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let json_layer = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
    });
    let compact_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(compact_layer)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))
}

/// Parse a level name (`error`, `warn`, `info`, `debug`, `trace`), case-insensitive.
pub fn parse_level(name: &str) -> Option<Level> {
    Level::from_str(name.trim()).ok()
}

fn level_name(level: Level) -> String {
    level.to_string().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.log_level, Level::WARN);
        assert!(config.module_levels.is_empty());
        assert_eq!(config.filter_directives(), "warn");
    }

    #[test]
    fn directives_include_module_overrides() {
        let config = TelemetryConfig::from_names(
            "info",
            [("taskdeck_store", "debug"), ("taskdeck", "TRACE")],
            false,
        );
        assert_eq!(
            config.filter_directives(),
            "info,taskdeck_store=debug,taskdeck=trace"
        );
    }

    #[test]
    fn unknown_levels_fall_back() {
        let config = TelemetryConfig::from_names("loud", [("taskdeck_store", "verbose")], true);
        assert_eq!(config.log_level, Level::WARN);
        assert!(config.module_levels.is_empty());
        assert!(config.json);
    }

    #[test]
    fn parse_level_is_case_insensitive() {
        assert_eq!(parse_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_level(" error "), Some(Level::ERROR));
        assert_eq!(parse_level("nope"), None);
    }

    #[test]
    fn second_init_reports_error() {
        let config = TelemetryConfig::default();
        let _ = init_telemetry(&config);
        assert!(init_telemetry(&config).is_err());
    }
}
