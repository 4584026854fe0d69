//! # taskdeck-settings
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`TaskdeckSettings::default()`]
//! 2. **User file**: `~/.taskdeck/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `TASKDECK_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    settings_path, taskdeck_home,
};
pub use types::*;
