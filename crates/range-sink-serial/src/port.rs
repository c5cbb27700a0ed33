//! Serial device handling: discovery and opening

use serialport::{SerialPort, SerialPortInfo};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Bound on a single blocking write to the controller
const WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Errors from opening or enumerating serial devices
#[derive(Debug, Error)]
pub enum PortError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to list serial ports: {0}")]
    List(#[from] serialport::Error),

    #[error("Serial worker failed: {0}")]
    Worker(String),
}

/// Open a serial device at `baud_rate`, 8N1, no flow control
pub fn open_port(path: &Path, baud_rate: u32) -> Result<Box<dyn SerialPort>, PortError> {
    let port = serialport::new(path.to_string_lossy(), baud_rate)
        .timeout(WRITE_TIMEOUT)
        .open()
        .map_err(|source| PortError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), baud = baud_rate, "Serial port opened");
    Ok(port)
}

/// List serial devices known to the OS, sorted by path
pub fn available_ports() -> Result<Vec<PathBuf>, PortError> {
    Ok(port_paths(serialport::available_ports()?))
}

fn port_paths(ports: Vec<SerialPortInfo>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = ports
        .into_iter()
        .map(|info| PathBuf::from(info.port_name))
        .collect();
    paths.sort();
    paths.dedup();
    paths
}
