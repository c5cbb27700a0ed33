//! Serial command sink implementation

use async_trait::async_trait;
use range_sink_api::{CommandSink, SinkError, SinkResult};
use range_util::NodeId;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::{PortError, encode_command, open_port};

type PortWriter = Box<dyn Write + Send>;

/// Serial line sink for the target controller
///
/// While no port is open, commands are logged and reported as delivered so
/// an exercise can be rehearsed without hardware attached.
pub struct SerialSink {
    port_path: PathBuf,
    baud_rate: u32,
    port: Arc<Mutex<Option<PortWriter>>>,
}

impl SerialSink {
    pub fn new(port_path: impl Into<PathBuf>, baud_rate: u32) -> Self {
        Self {
            port_path: port_path.into(),
            baud_rate,
            port: Arc::new(Mutex::new(None)),
        }
    }

    pub fn port_path(&self) -> &Path {
        &self.port_path
    }

    /// Point the sink at another device; takes effect on the next `connect`
    pub fn set_port(&mut self, port_path: impl Into<PathBuf>) {
        self.port_path = port_path.into();
    }

    /// Open the serial device, replacing any open one
    pub async fn connect(&self) -> Result<(), PortError> {
        let path = self.port_path.clone();
        let baud = self.baud_rate;

        let port = tokio::task::spawn_blocking(move || open_port(&path, baud))
            .await
            .map_err(|e| PortError::Worker(e.to_string()))??;

        self.attach(port);
        info!(port = %self.port_path.display(), baud = self.baud_rate, "Serial port connected");
        Ok(())
    }

    /// Use an already-open writer (e.g. a pseudo terminal or a capture file)
    pub fn attach(&self, writer: impl Write + Send + 'static) {
        *lock(&self.port) = Some(Box::new(writer));
    }

    /// Close the device; later sends are simulated
    pub fn disconnect(&self) {
        if lock(&self.port).take().is_some() {
            info!(port = %self.port_path.display(), "Serial port disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.port).is_some()
    }
}

// A panicked writer leaves the slot itself intact
fn lock(port: &Mutex<Option<PortWriter>>) -> MutexGuard<'_, Option<PortWriter>> {
    port.lock().unwrap_or_else(PoisonError::into_inner)
}

fn write_line(port: &Mutex<Option<PortWriter>>, node_id: NodeId, active: bool) -> SinkResult<()> {
    let line = encode_command(node_id, active);
    let mut guard = lock(port);

    match guard.as_mut() {
        Some(writer) => {
            writer
                .write_all(line.as_bytes())
                .and_then(|()| writer.flush())
                .map_err(|e| SinkError::WriteFailed(e.to_string()))?;
            debug!(node_id = %node_id, active, "Sent target command");
        }
        None => {
            info!(node_id = %node_id, active, "Simulated target command (no serial port)");
        }
    }

    Ok(())
}

#[async_trait]
impl CommandSink for SerialSink {
    async fn send_target_command(&self, node_id: NodeId, active: bool) -> SinkResult<()> {
        let port = self.port.clone();

        tokio::task::spawn_blocking(move || write_line(&port, node_id, active))
            .await
            .map_err(|e| SinkError::WriteFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn simulates_when_disconnected() {
        let sink = SerialSink::new("/dev/ttyACM0", 115200);
        assert!(!sink.is_connected());
        assert!(sink.send_target_command(NodeId::new(5), true).await.is_ok());
    }

    #[tokio::test]
    async fn writes_protocol_lines_to_attached_device() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let sink = SerialSink::new(file.path(), 115200);
        sink.attach(file.reopen().unwrap());
        assert!(sink.is_connected());

        sink.send_target_command(NodeId::new(5), true).await.unwrap();
        sink.send_target_command(NodeId::new(7), false).await.unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "5,true\n7,false\n");

        sink.disconnect();
        assert!(!sink.is_connected());
    }

    #[tokio::test]
    async fn write_error_is_reported() {
        let sink = SerialSink::new("/dev/ttyACM0", 115200);
        sink.attach(BrokenPipe);

        let result = sink.send_target_command(NodeId::new(2), true).await;
        assert!(matches!(result, Err(SinkError::WriteFailed(_))));
        assert!(sink.is_connected());
    }

    #[tokio::test]
    async fn connect_to_missing_port_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SerialSink::new(dir.path().join("ttyACM0"), 115200);

        let result = sink.connect().await;
        assert!(matches!(result, Err(PortError::Open { .. })));
        assert!(!sink.is_connected());
    }

    #[test]
    fn set_port_changes_path() {
        let mut sink = SerialSink::new("/dev/ttyACM0", 115200);
        sink.set_port("/dev/ttyUSB1");
        assert_eq!(sink.port_path(), Path::new("/dev/ttyUSB1"));
    }
}
