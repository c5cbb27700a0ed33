//! Fire-and-forget command dispatch

use range_api::TargetCommand;
use range_sink_api::{CommandSink, SinkError};
use range_util::RunId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::CoreEvent;

/// Single path every dispatch failure goes through
#[derive(Clone)]
pub struct FailureReporter {
    events: broadcast::Sender<CoreEvent>,
}

impl FailureReporter {
    pub fn new(events: broadcast::Sender<CoreEvent>) -> Self {
        Self { events }
    }

    pub fn report(&self, run_id: Option<RunId>, command: TargetCommand, err: &SinkError) {
        error!(
            run_id = ?run_id,
            node_id = %command.node_id,
            active = command.active,
            error = %err,
            "Target command failed"
        );

        // No subscribers is fine
        let _ = self.events.send(CoreEvent::DispatchFailed {
            run_id,
            command,
            error: err.to_string(),
        });
    }
}

/// Sends target commands without waiting for them
///
/// Each command runs in its own task under a timeout, so a slow or failing
/// node never holds up the caller or the other commands.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<dyn CommandSink>,
    reporter: FailureReporter,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn CommandSink>, reporter: FailureReporter, timeout: Duration) -> Self {
        Self {
            sink,
            reporter,
            timeout,
        }
    }

    /// Spawn one task per command, in order
    pub fn dispatch(&self, run_id: Option<RunId>, commands: &[TargetCommand]) -> Vec<JoinHandle<()>> {
        commands
            .iter()
            .map(|&command| self.dispatch_one(run_id, command))
            .collect()
    }

    fn dispatch_one(&self, run_id: Option<RunId>, command: TargetCommand) -> JoinHandle<()> {
        let sink = self.sink.clone();
        let reporter = self.reporter.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            let send = sink.send_target_command(command.node_id, command.active);
            let result = match tokio::time::timeout(timeout, send).await {
                Ok(result) => result,
                Err(_) => Err(SinkError::Timeout(timeout)),
            };

            match result {
                Ok(()) => debug!(run_id = ?run_id, command = %command, "Target command sent"),
                Err(e) => reporter.report(run_id, command, &e),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use range_sink_api::MockSink;
    use range_util::NodeId;

    fn setup(timeout: Duration) -> (Arc<MockSink>, Dispatcher, broadcast::Receiver<CoreEvent>) {
        let sink = Arc::new(MockSink::new());
        let (tx, rx) = broadcast::channel(16);
        let dispatcher = Dispatcher::new(sink.clone(), FailureReporter::new(tx), timeout);
        (sink, dispatcher, rx)
    }

    async fn join_all(handles: Vec<JoinHandle<()>>) {
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_commands_reach_the_sink() {
        let (sink, dispatcher, mut rx) = setup(Duration::from_secs(1));
        let commands = [
            TargetCommand::activate(NodeId::new(1)),
            TargetCommand::deactivate(NodeId::new(2)),
        ];

        join_all(dispatcher.dispatch(None, &commands)).await;

        assert_eq!(sink.calls_for(NodeId::new(1)), vec![true]);
        assert_eq!(sink.calls_for(NodeId::new(2)), vec![false]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_isolated() {
        let (sink, dispatcher, mut rx) = setup(Duration::from_secs(1));
        sink.set_failing(NodeId::new(2), true);
        let run_id = RunId::new();

        let commands = [
            TargetCommand::activate(NodeId::new(2)),
            TargetCommand::activate(NodeId::new(3)),
        ];
        join_all(dispatcher.dispatch(Some(run_id), &commands)).await;

        assert_eq!(sink.calls_for(NodeId::new(3)), vec![true]);

        match rx.try_recv().unwrap() {
            CoreEvent::DispatchFailed {
                run_id: Some(id),
                command,
                ..
            } => {
                assert_eq!(id, run_id);
                assert_eq!(command, TargetCommand::activate(NodeId::new(2)));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_sink_times_out() {
        let (sink, dispatcher, mut rx) = setup(Duration::from_millis(500));
        sink.set_delay(Some(Duration::from_secs(5)));

        join_all(dispatcher.dispatch(None, &[TargetCommand::activate(NodeId::new(7))])).await;

        match rx.try_recv().unwrap() {
            CoreEvent::DispatchFailed { error, .. } => assert!(error.contains("timed out")),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
