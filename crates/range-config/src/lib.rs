//! Exercise configuration parsing and validation for rangemaster
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Daemon settings (tick period, dispatch timeout, serial port)
//! - A target catalog and the activation windows that reference it
//! - Validation with clear error messages

mod exercise;
mod schema;
mod validation;

pub use exercise::*;
pub use schema::*;
pub use validation::*;

use range_api::InvalidSession;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Invalid session: {0}")]
    InvalidSession(#[from] InvalidSession),

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<ExerciseConfig> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading exercise config");
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<ExerciseConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    // Validate
    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(ExerciseConfig::from_raw(raw)?)
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;
