//! Async session scheduler
//!
//! A single task owns the [`SessionEngine`] and serialises every mutation:
//! start and abort requests arrive over a channel, the tick comes from an
//! interval that only exists while a session is running. Observers read
//! snapshots from a watch channel and never contend with the task.

use range_api::{EndReason, SchedulerState, Session, SessionStatus, TargetCommand};
use range_sink_api::CommandSink;
use range_util::{MonotonicInstant, NodeId, RunId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::dispatch::{Dispatcher, FailureReporter};
use crate::engine::{SessionEngine, StopDecision, TickOutcome};
use crate::snapshot::SchedulerSnapshot;
use crate::{CoreError, CoreEvent, CoreResult};

const REQUEST_QUEUE: usize = 32;
const EVENT_QUEUE: usize = 256;

/// Slowest tick that still samples every whole second of the timeline
pub const MAX_TICK_INTERVAL: Duration = Duration::from_millis(999);
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Scheduler timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// How often the active set is re-evaluated; see [`MAX_TICK_INTERVAL`]
    pub tick_interval: Duration,
    /// Upper bound on a single target command
    pub dispatch_timeout: Duration,
}

impl SchedulerConfig {
    /// Clamp the tick into `1ms..=MAX_TICK_INTERVAL`
    ///
    /// A tick of a second or more can step over a one-second window entirely.
    pub fn normalized(self) -> Self {
        let tick_interval = self.tick_interval.clamp(MIN_TICK_INTERVAL, MAX_TICK_INTERVAL);
        if tick_interval != self.tick_interval {
            warn!(
                requested_ms = self.tick_interval.as_millis() as u64,
                tick_ms = tick_interval.as_millis() as u64,
                "Tick interval out of range, clamped"
            );
        }
        Self {
            tick_interval,
            ..self
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(200),
            dispatch_timeout: Duration::from_millis(1000),
        }
    }
}

enum Request {
    Start {
        session: Session,
        reply: oneshot::Sender<CoreResult<RunId>>,
    },
    Abort {
        reply: oneshot::Sender<bool>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Task that drives sessions against a [`CommandSink`]
pub struct SessionScheduler {
    engine: SessionEngine,
    dispatcher: Dispatcher,
    config: SchedulerConfig,
    events: broadcast::Sender<CoreEvent>,
    snapshots: watch::Sender<SchedulerSnapshot>,
    ticker: Option<Interval>,
    in_flight: Vec<JoinHandle<()>>,
}

impl SessionScheduler {
    /// Spawn the scheduler task on the current runtime
    pub fn spawn(sink: Arc<dyn CommandSink>, config: SchedulerConfig) -> SchedulerHandle {
        let config = config.normalized();
        let (requests, request_rx) = mpsc::channel(REQUEST_QUEUE);
        let (events, _) = broadcast::channel(EVENT_QUEUE);
        let (snapshots, snapshot_rx) = watch::channel(SchedulerSnapshot::default());

        let reporter = FailureReporter::new(events.clone());
        let scheduler = Self {
            engine: SessionEngine::new(),
            dispatcher: Dispatcher::new(sink, reporter, config.dispatch_timeout),
            config,
            events: events.clone(),
            snapshots,
            ticker: None,
            in_flight: Vec::new(),
        };

        tokio::spawn(scheduler.run(request_rx));

        SchedulerHandle {
            requests,
            events,
            snapshots: snapshot_rx,
        }
    }

    async fn run(mut self, mut requests: mpsc::Receiver<Request>) {
        debug!(
            tick_ms = self.config.tick_interval.as_millis() as u64,
            dispatch_timeout_ms = self.config.dispatch_timeout.as_millis() as u64,
            "Scheduler running"
        );

        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(Request::Start { session, reply }) => {
                        let _ = reply.send(self.start(session));
                    }
                    Some(Request::Abort { reply }) => {
                        let _ = reply.send(self.teardown(EndReason::Aborted));
                    }
                    Some(Request::Shutdown { reply }) => {
                        self.shutdown().await;
                        let _ = reply.send(());
                        return;
                    }
                    // Every handle dropped
                    None => {
                        self.shutdown().await;
                        return;
                    }
                },

                _ = next_tick(&mut self.ticker) => self.on_tick(),
            }
        }
    }

    fn start(&mut self, session: Session) -> CoreResult<RunId> {
        let (run_id, event) =
            self.engine
                .start(session, range_util::now(), MonotonicInstant::now())?;

        // First tick fires immediately, evaluating elapsed 0
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.ticker = Some(ticker);

        self.publish_snapshot();
        self.publish(event);
        Ok(run_id)
    }

    fn on_tick(&mut self) {
        self.in_flight.retain(|handle| !handle.is_finished());

        match self.engine.tick(MonotonicInstant::now()) {
            TickOutcome::NotRunning => {
                self.ticker = None;
            }
            TickOutcome::Advanced {
                elapsed_seconds,
                diff,
            } => {
                self.publish_snapshot();
                if diff.is_empty() {
                    return;
                }

                let run_id = self.engine.run_id();
                self.dispatch(run_id, &diff.commands());

                if let Some(run_id) = run_id {
                    self.publish(CoreEvent::TargetsChanged {
                        run_id,
                        elapsed_seconds,
                        activated: diff.to_activate,
                        deactivated: diff.to_deactivate,
                    });
                }
            }
            TickOutcome::Expired { .. } => {
                self.teardown(EndReason::Completed);
            }
        }
    }

    /// Cancel the timer, sweep live nodes, return to Idle
    ///
    /// Returns false when there was nothing to tear down.
    fn teardown(&mut self, reason: EndReason) -> bool {
        self.ticker = None;

        let result = match self.engine.stop_current(reason) {
            StopDecision::Stopped(result) => result,
            StopDecision::NoActiveSession => return false,
        };

        self.publish_snapshot();
        self.publish(result.to_event());
        self.dispatch(Some(result.run_id), &result.sweep);

        if let Some(event) = self.engine.finish_teardown() {
            self.publish(event);
        }
        self.publish_snapshot();
        true
    }

    async fn shutdown(&mut self) {
        self.teardown(EndReason::Aborted);

        let pending = std::mem::take(&mut self.in_flight);
        if !pending.is_empty() {
            debug!(count = pending.len(), "Waiting for in-flight target commands");
        }
        for handle in pending {
            let _ = handle.await;
        }

        info!("Scheduler stopped");
    }

    fn dispatch(&mut self, run_id: Option<RunId>, commands: &[TargetCommand]) {
        let handles = self.dispatcher.dispatch(run_id, commands);
        self.in_flight.extend(handles);
    }

    fn publish(&self, event: CoreEvent) {
        let _ = self.events.send(event);
    }

    fn publish_snapshot(&self) {
        self.snapshots.send_replace(self.engine.snapshot());
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Cloneable front end to a running [`SessionScheduler`]
#[derive(Clone)]
pub struct SchedulerHandle {
    requests: mpsc::Sender<Request>,
    events: broadcast::Sender<CoreEvent>,
    snapshots: watch::Receiver<SchedulerSnapshot>,
}

impl SchedulerHandle {
    /// Start executing `session`
    pub async fn start(&self, session: Session) -> CoreResult<RunId> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Start { session, reply }).await?;
        rx.await.map_err(|_| CoreError::SchedulerStopped)?
    }

    /// End the running session early; `false` if nothing was running
    pub async fn abort(&self) -> CoreResult<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Abort { reply }).await?;
        rx.await.map_err(|_| CoreError::SchedulerStopped)
    }

    /// Abort any session, wait for its sweep to resolve, stop the task
    pub async fn shutdown(&self) -> CoreResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Shutdown { reply }).await?;
        rx.await.map_err(|_| CoreError::SchedulerStopped)
    }

    async fn send(&self, request: Request) -> CoreResult<()> {
        self.requests
            .send(request)
            .await
            .map_err(|_| CoreError::SchedulerStopped)
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.snapshots.borrow().status()
    }

    pub fn is_running(&self) -> bool {
        self.snapshots.borrow().is_running()
    }

    pub fn current_elapsed_seconds(&self) -> u64 {
        self.snapshots.borrow().current_elapsed_seconds()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.snapshots.borrow().remaining_seconds()
    }

    pub fn is_node_active(&self, node_id: NodeId) -> bool {
        self.snapshots.borrow().is_node_active(node_id)
    }

    pub fn remaining_seconds_for_node(&self, node_id: NodeId) -> u64 {
        self.snapshots.borrow().remaining_seconds_for_node(node_id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    pub fn watch(&self) -> watch::Receiver<SchedulerSnapshot> {
        self.snapshots.clone()
    }

    /// Resolve once the scheduler is Idle
    pub async fn wait_idle(&self) -> CoreResult<()> {
        let mut rx = self.snapshots.clone();
        rx.wait_for(|s| s.state == SchedulerState::Idle)
            .await
            .map(|_| ())
            .map_err(|_| CoreError::SchedulerStopped)
    }
}
