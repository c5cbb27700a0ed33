//! Validated exercise configuration

use crate::schema::{RawConfig, RawDaemonConfig, RawTarget};
use range_api::{ActivationWindow, InvalidSession, Session, TargetRef};
use range_util::{NodeId, default_serial_port};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default scheduler tick period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Default upper bound for one target command
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_millis(1000);

/// Default serial line speed
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Validated configuration ready for the daemon
#[derive(Debug, Clone)]
pub struct ExerciseConfig {
    /// Daemon settings
    pub daemon: DaemonSettings,

    /// The exercise timeline
    pub session: Session,
}

impl ExerciseConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Result<Self, InvalidSession> {
        let targets: HashMap<&str, &RawTarget> =
            raw.targets.iter().map(|t| (t.id.as_str(), t)).collect();

        // Unknown references were rejected by validation
        let windows = raw
            .windows
            .iter()
            .filter_map(|w| {
                targets.get(w.target.as_str()).map(|t| {
                    ActivationWindow::new(convert_target(t), w.start, w.end)
                })
            })
            .collect();

        let session = Session::new(
            raw.session.id,
            raw.session.name,
            raw.session.total_time,
            windows,
        )?;

        Ok(Self {
            daemon: DaemonSettings::from_raw(raw.daemon),
            session,
        })
    }
}

fn convert_target(raw: &RawTarget) -> TargetRef {
    TargetRef::new(NodeId::new(raw.node_id), raw.distance, raw.image_num)
}

/// Daemon settings
#[derive(Debug, Clone)]
pub struct DaemonSettings {
    pub tick_interval: Duration,
    pub dispatch_timeout: Duration,
    pub serial_port: PathBuf,
    pub baud_rate: u32,
}

impl DaemonSettings {
    fn from_raw(raw: RawDaemonConfig) -> Self {
        Self {
            tick_interval: raw
                .tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TICK_INTERVAL),
            dispatch_timeout: raw
                .dispatch_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DISPATCH_TIMEOUT),
            serial_port: raw.serial_port.unwrap_or_else(default_serial_port),
            baud_rate: raw.baud_rate.unwrap_or(DEFAULT_BAUD_RATE),
        }
    }
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self::from_raw(RawDaemonConfig::default())
    }
}
