//! Configuration validation
//!
//! Only config-level shape is checked here. Timeline ordering is enforced by
//! `Session::new` when the exercise is built.

use crate::schema::{RawConfig, RawDaemonConfig, RawTarget};
use std::collections::HashSet;
use thiserror::Error;

/// Serial line speeds the target controller accepts
pub const SUPPORTED_BAUD_RATES: &[u32] = &[9600, 19200, 38400, 57600, 115200, 230400];

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Target '{target_id}': {message}")]
    TargetError { target_id: String, message: String },

    #[error("Duplicate target ID: {0}")]
    DuplicateTargetId(String),

    #[error("Window {index} references unknown target '{target}'")]
    UnknownTarget { index: usize, target: String },

    #[error("Daemon config error: {0}")]
    DaemonError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_daemon(&config.daemon));

    // Check for duplicate target IDs
    let mut seen_ids = HashSet::new();
    for target in &config.targets {
        if !seen_ids.insert(target.id.as_str()) {
            errors.push(ValidationError::DuplicateTargetId(target.id.clone()));
        }
    }

    for target in &config.targets {
        errors.extend(validate_target(target));
    }

    for (index, window) in config.windows.iter().enumerate() {
        if !seen_ids.contains(window.target.as_str()) {
            errors.push(ValidationError::UnknownTarget {
                index,
                target: window.target.clone(),
            });
        }
    }

    errors
}

fn validate_daemon(daemon: &RawDaemonConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match daemon.tick_interval_ms {
        Some(0) => errors.push(ValidationError::DaemonError(
            "tick_interval_ms must be greater than zero".into(),
        )),
        Some(ms) if ms >= 1000 => errors.push(ValidationError::DaemonError(format!(
            "tick_interval_ms must be under 1000, got {}",
            ms
        ))),
        _ => {}
    }

    if daemon.dispatch_timeout_ms == Some(0) {
        errors.push(ValidationError::DaemonError(
            "dispatch_timeout_ms must be greater than zero".into(),
        ));
    }

    if let Some(baud) = daemon.baud_rate
        && !SUPPORTED_BAUD_RATES.contains(&baud)
    {
        errors.push(ValidationError::DaemonError(format!(
            "unsupported baud_rate {} (expected one of {:?})",
            baud, SUPPORTED_BAUD_RATES
        )));
    }

    errors
}

fn validate_target(target: &RawTarget) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if target.id.is_empty() {
        errors.push(ValidationError::TargetError {
            target_id: target.id.clone(),
            message: "id cannot be empty".into(),
        });
    }

    if !target.distance.is_finite() || target.distance < 0.0 {
        errors.push(ValidationError::TargetError {
            target_id: target.id.clone(),
            message: format!("distance must be a non-negative number, got {}", target.distance),
        });
    }

    errors
}
