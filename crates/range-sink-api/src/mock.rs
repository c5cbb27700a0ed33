//! Mock command sink for testing

use async_trait::async_trait;
use range_api::TargetCommand;
use range_util::NodeId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::{CommandSink, SinkError, SinkResult};

/// Mock sink for unit/integration testing
///
/// Every call is recorded as an attempt before any configured delay or
/// failure applies, so tests can assert on what the scheduler tried to send.
pub struct MockSink {
    calls: Arc<Mutex<Vec<TargetCommand>>>,
    call_tx: mpsc::UnboundedSender<TargetCommand>,
    call_rx: Arc<Mutex<Option<mpsc::UnboundedReceiver<TargetCommand>>>>,

    /// Nodes whose commands fail
    pub fail_nodes: Arc<Mutex<HashSet<NodeId>>>,

    /// Delay applied to every command before it resolves
    pub delay: Arc<Mutex<Option<Duration>>>,
}

impl MockSink {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            call_tx: tx,
            call_rx: Arc::new(Mutex::new(Some(rx))),
            fail_nodes: Arc::new(Mutex::new(HashSet::new())),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    /// All attempted commands, in call order
    pub fn calls(&self) -> Vec<TargetCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Attempted commands for one node, in call order
    pub fn calls_for(&self, node_id: NodeId) -> Vec<bool> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.node_id == node_id)
            .map(|c| c.active)
            .collect()
    }

    /// Make commands for `node_id` fail (or succeed again)
    pub fn set_failing(&self, node_id: NodeId, failing: bool) {
        let mut nodes = self.fail_nodes.lock().unwrap();
        if failing {
            nodes.insert(node_id);
        } else {
            nodes.remove(&node_id);
        }
    }

    /// Set per-command delay
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Receive attempted commands as they happen
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TargetCommand> {
        self.call_rx
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() can only be called once")
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandSink for MockSink {
    async fn send_target_command(&self, node_id: NodeId, active: bool) -> SinkResult<()> {
        let command = TargetCommand { node_id, active };
        self.calls.lock().unwrap().push(command);
        let _ = self.call_tx.send(command);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_nodes.lock().unwrap().contains(&node_id) {
            return Err(SinkError::Rejected {
                node_id,
                reason: "Mock failure".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_calls() {
        let sink = MockSink::new();
        let mut rx = sink.subscribe();

        sink.send_target_command(NodeId::new(5), true).await.unwrap();
        sink.send_target_command(NodeId::new(5), false).await.unwrap();

        assert_eq!(
            sink.calls(),
            vec![
                TargetCommand::activate(NodeId::new(5)),
                TargetCommand::deactivate(NodeId::new(5)),
            ]
        );
        assert_eq!(rx.recv().await, Some(TargetCommand::activate(NodeId::new(5))));
        assert_eq!(sink.calls_for(NodeId::new(5)), vec![true, false]);
    }

    #[tokio::test]
    async fn mock_failure_is_still_recorded() {
        let sink = MockSink::new();
        sink.set_failing(NodeId::new(3), true);

        let result = sink.send_target_command(NodeId::new(3), true).await;
        assert!(matches!(result, Err(SinkError::Rejected { .. })));
        assert_eq!(sink.calls_for(NodeId::new(3)), vec![true]);

        sink.set_failing(NodeId::new(3), false);
        assert!(sink.send_target_command(NodeId::new(3), false).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn mock_delay() {
        let sink = MockSink::new();
        sink.set_delay(Some(Duration::from_secs(2)));

        let start = tokio::time::Instant::now();
        sink.send_target_command(NodeId::new(1), true).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}
