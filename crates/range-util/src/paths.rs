//! Default paths for rangemaster components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/rangemaster/config.toml` or `~/.config/rangemaster/config.toml`
//! - Serial port: `/dev/ttyACM0`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const RANGE_CONFIG_ENV: &str = "RANGE_CONFIG";

/// Environment variable for overriding the serial port
pub const RANGE_SERIAL_PORT_ENV: &str = "RANGE_SERIAL_PORT";

/// Serial device the target controller enumerates as by default
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "rangemaster";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$RANGE_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/rangemaster/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/rangemaster/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(RANGE_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking the RANGE_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    // Last resort
    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default serial port path.
pub fn default_serial_port() -> PathBuf {
    PathBuf::from(DEFAULT_SERIAL_PORT)
}
