mod config;

pub use config::{Config, LlmConfig, NotificationsConfig, PlanningConfig, TimerConfig};

use std::path::PathBuf;

/// Returns `~/.config/taskline[-dev]/` based on TASKLINE_ENV.
///
/// Set TASKLINE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TASKLINE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("taskline-dev")
    } else {
        base_dir.join("taskline")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
