//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Daemon settings
    #[serde(default)]
    pub daemon: RawDaemonConfig,

    /// The exercise to run
    pub session: RawSession,

    /// Physical targets available on the range
    #[serde(default)]
    pub targets: Vec<RawTarget>,

    /// When each target is live
    #[serde(default)]
    pub windows: Vec<RawWindow>,
}

/// Daemon-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDaemonConfig {
    /// Scheduler tick period in milliseconds (default: 200)
    pub tick_interval_ms: Option<u64>,

    /// Upper bound for a single target command in milliseconds (default: 1000)
    pub dispatch_timeout_ms: Option<u64>,

    /// Serial device of the target controller (default: /dev/ttyACM0)
    pub serial_port: Option<PathBuf>,

    /// Serial line speed (default: 115200)
    pub baud_rate: Option<u32>,
}

/// Exercise header
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSession {
    /// Stable exercise ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Total exercise duration in seconds
    pub total_time: u64,
}

/// Raw target definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawTarget {
    /// Key referenced by windows
    pub id: String,

    /// Bus address of the target controller
    pub node_id: u32,

    /// Distance from the firing line, in meters
    #[serde(default)]
    pub distance: f64,

    /// Target face graphic number
    #[serde(default = "default_image_num")]
    pub image_num: u32,
}

fn default_image_num() -> u32 {
    1
}

/// Raw activation window
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawWindow {
    /// ID of a `[[targets]]` entry
    pub target: String,

    /// Seconds after session start when the target comes up
    pub start: u64,

    /// Seconds after session start when the target goes down
    pub end: u64,
}
