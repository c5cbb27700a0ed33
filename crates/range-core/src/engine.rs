//! Session state machine

use chrono::{DateTime, Local};
use range_api::{EndReason, SchedulerState, Session, TargetCommand};
use range_util::{MonotonicInstant, NodeId, RunId};
use tracing::{debug, info};

use crate::snapshot::SchedulerSnapshot;
use crate::tracker::{self, ActiveSetDiff};
use crate::{ActiveRun, CoreError, CoreEvent, CoreResult};

/// What a tick did to the running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No session, or the session is already tearing down
    NotRunning,
    /// Active set recomputed; `diff` is empty when nothing changed
    Advanced {
        elapsed_seconds: u64,
        diff: ActiveSetDiff,
    },
    /// Session duration reached; the caller must tear down
    Expired { elapsed_seconds: u64 },
}

/// Stop decision from the engine
#[derive(Debug)]
pub enum StopDecision {
    Stopped(StopResult),
    NoActiveSession,
}

/// Result of beginning teardown
#[derive(Debug, Clone)]
pub struct StopResult {
    pub run_id: RunId,
    pub reason: EndReason,
    pub elapsed_seconds: u64,
    /// Deactivations for every node still live, ascending
    pub sweep: Vec<TargetCommand>,
}

impl StopResult {
    pub fn to_event(&self) -> CoreEvent {
        CoreEvent::SessionEnding {
            run_id: self.run_id,
            reason: self.reason,
            elapsed_seconds: self.elapsed_seconds,
            sweep: self.sweep.iter().map(|c| c.node_id).collect(),
        }
    }
}

/// Synchronous core of the scheduler
///
/// Owns at most one [`ActiveRun`]. Time is always passed in, so every
/// transition can be driven deterministically from tests.
#[derive(Debug, Default)]
pub struct SessionEngine {
    current: Option<ActiveRun>,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin executing `session`, returning the new run's id and start event
    ///
    /// Fails with [`CoreError::AlreadyRunning`] while another session is
    /// Running or Ending, leaving that session untouched.
    pub fn start(
        &mut self,
        session: Session,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> CoreResult<(RunId, CoreEvent)> {
        if let Some(run) = &self.current {
            return Err(CoreError::AlreadyRunning { run_id: run.run_id });
        }

        let run = ActiveRun::new(session, now, now_mono);

        info!(
            run_id = %run.run_id,
            exercise_id = %run.session.id(),
            total_seconds = run.total_seconds(),
            windows = run.session.windows().len(),
            "Session started"
        );

        let event = CoreEvent::SessionStarted {
            run_id: run.run_id,
            exercise_id: run.session.id().clone(),
            name: run.session.name().to_string(),
            total_seconds: run.total_seconds(),
            started_at: run.started_at,
        };

        let run_id = run.run_id;
        self.current = Some(run);
        Ok((run_id, event))
    }

    /// Advance the running session to `now_mono`
    ///
    /// The active set is replaced before returning, so queries made right
    /// after a tick already reflect the commands it produced.
    pub fn tick(&mut self, now_mono: MonotonicInstant) -> TickOutcome {
        let run = match &mut self.current {
            Some(run) if run.state == SchedulerState::Running => run,
            _ => return TickOutcome::NotRunning,
        };

        let elapsed_seconds = run.elapsed_at(now_mono);
        run.elapsed_seconds = elapsed_seconds;

        if run.is_expired(elapsed_seconds) {
            debug!(run_id = %run.run_id, elapsed_seconds, "Session duration reached");
            return TickOutcome::Expired { elapsed_seconds };
        }

        let next = tracker::compute_active_set(&run.session, elapsed_seconds);
        let diff = tracker::diff(&run.active, &next);
        run.active = next;

        if !diff.is_empty() {
            debug!(
                run_id = %run.run_id,
                elapsed_seconds,
                activate = ?diff.to_activate,
                deactivate = ?diff.to_deactivate,
                "Active set changed"
            );
        }

        TickOutcome::Advanced {
            elapsed_seconds,
            diff,
        }
    }

    /// Move the running session to Ending and collect its sweep
    ///
    /// Calling this again while Ending returns `NoActiveSession`, so the sweep
    /// is produced exactly once per run.
    pub fn stop_current(&mut self, reason: EndReason) -> StopDecision {
        let run = match &mut self.current {
            Some(run) if run.state == SchedulerState::Running => run,
            _ => return StopDecision::NoActiveSession,
        };

        run.mark_ending(reason);

        let sweep: Vec<TargetCommand> = run
            .active
            .iter()
            .map(|&id| TargetCommand::deactivate(id))
            .collect();

        info!(
            run_id = %run.run_id,
            reason = ?reason,
            elapsed_seconds = run.elapsed_seconds,
            sweep = sweep.len(),
            "Session ending"
        );

        StopDecision::Stopped(StopResult {
            run_id: run.run_id,
            reason,
            elapsed_seconds: run.elapsed_seconds,
            sweep,
        })
    }

    /// Drop the Ending session and return to Idle
    pub fn finish_teardown(&mut self) -> Option<CoreEvent> {
        if self.state() != SchedulerState::Ending {
            return None;
        }
        let run = self.current.take()?;
        let reason = run.end_reason.unwrap_or(EndReason::Aborted);

        info!(
            run_id = %run.run_id,
            reason = ?reason,
            elapsed_seconds = run.elapsed_seconds,
            "Session ended"
        );

        Some(CoreEvent::SessionEnded {
            run_id: run.run_id,
            reason,
            elapsed_seconds: run.elapsed_seconds,
        })
    }

    pub fn state(&self) -> SchedulerState {
        self.current
            .as_ref()
            .map(|run| run.state)
            .unwrap_or(SchedulerState::Idle)
    }

    /// True only while Running; Ending counts as not running
    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    pub fn run_id(&self) -> Option<RunId> {
        self.current.as_ref().map(|run| run.run_id)
    }

    pub fn current_elapsed_seconds(&self) -> u64 {
        self.current
            .as_ref()
            .map(|run| run.elapsed_seconds)
            .unwrap_or(0)
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.current
            .as_ref()
            .map(|run| run.remaining_seconds())
            .unwrap_or(0)
    }

    pub fn is_node_active(&self, node_id: NodeId) -> bool {
        self.current
            .as_ref()
            .is_some_and(|run| run.is_node_active(node_id))
    }

    pub fn remaining_seconds_for_node(&self, node_id: NodeId) -> u64 {
        self.current
            .as_ref()
            .map(|run| run.remaining_seconds_for_node(node_id))
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        match &self.current {
            Some(run) => SchedulerSnapshot {
                state: run.state,
                run_id: Some(run.run_id),
                session: Some(run.session.clone()),
                started_at: Some(run.started_at),
                elapsed_seconds: run.elapsed_seconds,
                active: run.active.clone(),
            },
            None => SchedulerSnapshot::default(),
        }
    }
}
