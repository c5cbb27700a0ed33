//! Read-only scheduler snapshots for observers

use chrono::{DateTime, Local};
use range_api::{SchedulerState, Session, SessionStatus, TargetStatus};
use range_util::{NodeId, RunId};
use std::sync::Arc;

use crate::tracker::{self, ActiveSet};

/// Copy of the scheduler's state at the end of its last transition
///
/// Observers read these without touching the scheduler itself, so a value may
/// trail the live state by up to one tick.
#[derive(Debug, Clone, Default)]
pub struct SchedulerSnapshot {
    pub state: SchedulerState,
    pub run_id: Option<RunId>,
    pub session: Option<Arc<Session>>,
    pub started_at: Option<DateTime<Local>>,
    pub elapsed_seconds: u64,
    pub active: ActiveSet,
}

impl SchedulerSnapshot {
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn current_elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Seconds left in the session; 0 when idle
    pub fn remaining_seconds(&self) -> u64 {
        self.session
            .as_ref()
            .map(|s| s.total_duration_seconds().saturating_sub(self.elapsed_seconds))
            .unwrap_or(0)
    }

    pub fn is_node_active(&self, node_id: NodeId) -> bool {
        self.active.contains(&node_id)
    }

    pub fn remaining_seconds_for_node(&self, node_id: NodeId) -> u64 {
        match &self.session {
            Some(session) => tracker::remaining_seconds_for_node(
                session,
                &self.active,
                node_id,
                self.elapsed_seconds,
            ),
            None => 0,
        }
    }

    /// Serialisable view with a countdown for every target in the timeline
    pub fn status(&self) -> SessionStatus {
        let Some(session) = &self.session else {
            return SessionStatus::idle();
        };

        let targets = session
            .node_ids()
            .into_iter()
            .map(|node_id| TargetStatus {
                node_id,
                active: self.is_node_active(node_id),
                remaining_seconds: self.remaining_seconds_for_node(node_id),
            })
            .collect();

        SessionStatus {
            state: self.state,
            run_id: self.run_id,
            exercise_id: Some(session.id().clone()),
            name: Some(session.name().to_string()),
            started_at: self.started_at,
            elapsed_seconds: self.elapsed_seconds,
            remaining_seconds: self.remaining_seconds(),
            targets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use range_api::{ActivationWindow, TargetRef};

    #[test]
    fn idle_snapshot_answers_every_query() {
        let snapshot = SchedulerSnapshot::default();

        assert!(!snapshot.is_running());
        assert_eq!(snapshot.current_elapsed_seconds(), 0);
        assert_eq!(snapshot.remaining_seconds(), 0);
        assert!(!snapshot.is_node_active(NodeId::new(1)));
        assert_eq!(snapshot.remaining_seconds_for_node(NodeId::new(1)), 0);
        assert_eq!(snapshot.status(), SessionStatus::idle());
    }

    #[test]
    fn status_lists_every_target() {
        let session = Session::new(
            "drill",
            "Drill",
            10,
            vec![
                ActivationWindow::new(TargetRef::new(NodeId::new(5), 25.0, 1), 2, 6),
                ActivationWindow::new(TargetRef::new(NodeId::new(2), 50.0, 1), 7, 9),
            ],
        )
        .unwrap();

        let snapshot = SchedulerSnapshot {
            state: SchedulerState::Running,
            run_id: Some(RunId::new()),
            session: Some(Arc::new(session)),
            started_at: None,
            elapsed_seconds: 3,
            active: [NodeId::new(5)].into_iter().collect(),
        };

        let status = snapshot.status();
        assert_eq!(status.remaining_seconds, 7);
        assert_eq!(status.name.as_deref(), Some("Drill"));
        assert_eq!(
            status.targets,
            vec![
                TargetStatus {
                    node_id: NodeId::new(2),
                    active: false,
                    remaining_seconds: 0,
                },
                TargetStatus {
                    node_id: NodeId::new(5),
                    active: true,
                    remaining_seconds: 3,
                },
            ]
        );
    }
}
