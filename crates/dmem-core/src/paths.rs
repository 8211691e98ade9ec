//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the dmem base directory (~/.dmem).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".dmem"))
}

/// Get the main config file path (~/.dmem/dmem.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("dmem.json5"))
}

/// Get the plugin settings file path (~/.dmem/settings.json).
pub fn settings_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("settings.json"))
}
