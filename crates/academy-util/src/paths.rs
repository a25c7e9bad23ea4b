//! Default paths for academy components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/academy/config.toml` or `~/.config/academy/config.toml`
//! - Data: `$XDG_DATA_HOME/academy` or `~/.local/share/academy`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const ACADEMY_CONFIG_ENV: &str = "ACADEMY_CONFIG";

/// Environment variable for overriding the data directory
pub const ACADEMY_DATA_DIR_ENV: &str = "ACADEMY_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "academy";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Database filename within the data directory
pub const DB_FILENAME: &str = "academy.db";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$ACADEMY_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/academy/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/academy/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(ACADEMY_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/tmp").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$ACADEMY_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/academy` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/academy` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(ACADEMY_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
