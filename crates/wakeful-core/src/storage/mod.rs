mod config;
mod store;

pub use config::{Config, DefaultsConfig, FeedbackConfig};
pub use store::{AlarmStore, FileStore};

use std::path::PathBuf;

/// Returns `~/.config/wakeful[-dev]/` based on WAKEFUL_ENV.
///
/// Set WAKEFUL_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WAKEFUL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wakeful-dev")
    } else {
        base_dir.join("wakeful")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
