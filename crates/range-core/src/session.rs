//! Session runtime state

use chrono::{DateTime, Local};
use range_api::{EndReason, SchedulerState, Session};
use range_util::{MonotonicInstant, NodeId, RunId, whole_seconds};
use std::sync::Arc;

use crate::tracker::{self, ActiveSet};

/// State of the one session a scheduler is driving
#[derive(Debug)]
pub struct ActiveRun {
    /// Identifier for this run (log correlation)
    pub run_id: RunId,

    /// The timeline being executed
    pub session: Arc<Session>,

    /// Running or Ending
    pub state: SchedulerState,

    /// Wall-clock start time (for display/logging)
    pub started_at: DateTime<Local>,

    /// Monotonic start time (for progress)
    pub started_at_mono: MonotonicInstant,

    /// Whole seconds elapsed as of the last tick
    pub elapsed_seconds: u64,

    /// Nodes the scheduler intends to be live
    pub active: ActiveSet,

    /// Set once teardown begins
    pub end_reason: Option<EndReason>,
}

impl ActiveRun {
    pub fn new(session: Session, now: DateTime<Local>, now_mono: MonotonicInstant) -> Self {
        Self {
            run_id: RunId::new(),
            session: Arc::new(session),
            state: SchedulerState::Running,
            started_at: now,
            started_at_mono: now_mono,
            elapsed_seconds: 0,
            active: ActiveSet::new(),
            end_reason: None,
        }
    }

    /// Whole seconds since start at `now_mono`
    pub fn elapsed_at(&self, now_mono: MonotonicInstant) -> u64 {
        whole_seconds(now_mono.duration_since(self.started_at_mono))
    }

    pub fn total_seconds(&self) -> u64 {
        self.session.total_duration_seconds()
    }

    /// Whether `elapsed_seconds` has reached the session duration
    pub fn is_expired(&self, elapsed_seconds: u64) -> bool {
        elapsed_seconds >= self.total_seconds()
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.total_seconds().saturating_sub(self.elapsed_seconds)
    }

    pub fn is_node_active(&self, node_id: NodeId) -> bool {
        self.active.contains(&node_id)
    }

    pub fn remaining_seconds_for_node(&self, node_id: NodeId) -> u64 {
        tracker::remaining_seconds_for_node(
            &self.session,
            &self.active,
            node_id,
            self.elapsed_seconds,
        )
    }

    pub fn mark_ending(&mut self, reason: EndReason) {
        self.state = SchedulerState::Ending;
        self.end_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use range_api::{ActivationWindow, TargetRef};
    use std::time::Duration;

    fn make_run(total: u64) -> ActiveRun {
        let session = Session::new(
            "drill",
            "Drill",
            total,
            vec![ActivationWindow::new(TargetRef::new(NodeId::new(5), 10.0, 1), 2, 6)],
        )
        .unwrap();
        ActiveRun::new(session, Local::now(), MonotonicInstant::now())
    }

    #[test]
    fn test_run_creation() {
        let run = make_run(10);

        assert_eq!(run.state, SchedulerState::Running);
        assert_eq!(run.elapsed_seconds, 0);
        assert!(run.active.is_empty());
        assert_eq!(run.remaining_seconds(), 10);
    }

    #[test]
    fn test_elapsed_rounds_down() {
        let run = make_run(10);
        let start = run.started_at_mono;

        assert_eq!(run.elapsed_at(start), 0);
        assert_eq!(run.elapsed_at(start + Duration::from_millis(999)), 0);
        assert_eq!(run.elapsed_at(start + Duration::from_millis(2400)), 2);
    }

    #[test]
    fn test_expiry() {
        let run = make_run(10);
        assert!(!run.is_expired(9));
        assert!(run.is_expired(10));
        assert!(run.is_expired(11));
    }

    #[test]
    fn test_remaining_saturates() {
        let mut run = make_run(10);
        run.elapsed_seconds = 12;
        assert_eq!(run.remaining_seconds(), 0);
    }
}
