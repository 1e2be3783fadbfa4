//! Where taskboard keeps its files.
//!
//! TASKBOARD_HOME resolution order:
//! 1. TASKBOARD_HOME environment variable (if set)
//! 2. `<user config dir>/taskboard`
//! 3. `.taskboard` in the working directory, when no config dir is known

use std::path::PathBuf;

pub const HOME_ENV: &str = "TASKBOARD_HOME";

pub fn taskboard_home() -> PathBuf {
    if let Ok(home) = std::env::var(HOME_ENV) {
        return PathBuf::from(home);
    }

    dirs::config_dir()
        .map(|dir| dir.join("taskboard"))
        .unwrap_or_else(|| PathBuf::from(".taskboard"))
}

pub fn config_path() -> PathBuf {
    taskboard_home().join("config.toml")
}

pub fn log_dir() -> PathBuf {
    taskboard_home().join("logs")
}
