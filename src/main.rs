//! # taskdeck
//!
//! CLI binary: loads settings, installs logging, opens the database, and
//! runs one command. Results go to stdout as JSON, logs to stderr.

#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use taskdeck::cli::{self, Cli};
use taskdeck::TaskDeck;
use taskdeck_settings::{load_settings, load_settings_from_path, taskdeck_home};
use taskdeck_telemetry::{init_telemetry, TelemetryConfig};

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("taskdeck: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = match &cli.settings {
        Some(path) => load_settings_from_path(path),
        None => load_settings(),
    }
    .context("Failed to load settings")?;

    let telemetry = TelemetryConfig::from_names(
        &settings.logging.level,
        settings
            .logging
            .module_levels
            .iter()
            .map(|(module, level)| (module.as_str(), level.as_str())),
        settings.logging.json,
    );
    init_telemetry(&telemetry).context("Failed to initialise logging")?;

    let db_path = cli
        .db_path
        .clone()
        .unwrap_or_else(|| settings.database.resolve_path(&taskdeck_home()));
    let deck = TaskDeck::open(&db_path, &settings)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;

    match cli::execute(&deck, cli.command) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            if e.is_user_correctable() {
                warn!(kind = e.kind(), error = %e, "command rejected");
            }
            println!("{}", serde_json::to_string_pretty(&cli::error_body(&e))?);
            Ok(ExitCode::from(cli::exit_status(&e)))
        }
    }
}
