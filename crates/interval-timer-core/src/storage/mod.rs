mod config;
pub mod database;
pub mod presets;

pub use config::Config;
pub use database::Database;
pub use presets::{Preset, PresetStore};

use std::path::PathBuf;

/// Returns `~/.config/interval-timer[-dev]/` based on INTERVAL_TIMER_ENV.
///
/// Set INTERVAL_TIMER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("INTERVAL_TIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("interval-timer-dev")
    } else {
        base_dir.join("interval-timer")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
