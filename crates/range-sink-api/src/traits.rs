//! Command sink traits

use async_trait::async_trait;
use range_util::NodeId;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single target command
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Target {node_id} rejected command: {reason}")]
    Rejected { node_id: NodeId, reason: String },

    #[error("Command timed out after {0:?}")]
    Timeout(Duration),
}

pub type SinkResult<T> = Result<T, SinkError>;

/// Transport that delivers activation commands to physical targets
///
/// Implementations must tolerate duplicate `(node_id, active)` pairs and must
/// resolve in bounded time.
#[async_trait]
pub trait CommandSink: Send + Sync {
    /// Raise (`active = true`) or lower a target
    async fn send_target_command(&self, node_id: NodeId, active: bool) -> SinkResult<()>;
}
