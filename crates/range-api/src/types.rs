//! Shared types for the rangemaster API

use chrono::{DateTime, Local};
use range_util::{ExerciseId, NodeId, RunId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single state change for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetCommand {
    pub node_id: NodeId,
    pub active: bool,
}

impl TargetCommand {
    pub fn activate(node_id: NodeId) -> Self {
        Self {
            node_id,
            active: true,
        }
    }

    pub fn deactivate(node_id: NodeId) -> Self {
        Self {
            node_id,
            active: false,
        }
    }
}

impl fmt::Display for TargetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.active { "activate" } else { "deactivate" };
        write!(f, "{}({})", verb, self.node_id)
    }
}

/// Scheduler lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// No session loaded
    #[default]
    Idle,
    /// Ticking through a session
    Running,
    /// Timer cancelled, deactivation sweep in progress
    Ending,
}

/// Why a session left the Running state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Elapsed time reached the session duration
    Completed,
    /// Stopped from outside before the duration ran out
    Aborted,
}

/// Countdown view of one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetStatus {
    pub node_id: NodeId,
    pub active: bool,
    pub remaining_seconds: u64,
}

/// Point-in-time status for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub state: SchedulerState,
    pub run_id: Option<RunId>,
    pub exercise_id: Option<ExerciseId>,
    pub name: Option<String>,
    pub started_at: Option<DateTime<Local>>,
    pub elapsed_seconds: u64,
    pub remaining_seconds: u64,
    pub targets: Vec<TargetStatus>,
}

impl SessionStatus {
    /// Status of a scheduler with nothing loaded
    pub fn idle() -> Self {
        Self {
            state: SchedulerState::Idle,
            run_id: None,
            exercise_id: None,
            name: None,
            started_at: None,
            elapsed_seconds: 0,
            remaining_seconds: 0,
            targets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_display() {
        assert_eq!(TargetCommand::activate(NodeId::new(5)).to_string(), "activate(5)");
        assert_eq!(TargetCommand::deactivate(NodeId::new(5)).to_string(), "deactivate(5)");
    }

    #[test]
    fn status_serialization() {
        let status = SessionStatus {
            state: SchedulerState::Running,
            run_id: Some(RunId::new()),
            exercise_id: Some(ExerciseId::new("qualifier")),
            name: Some("Qualifier".into()),
            started_at: None,
            elapsed_seconds: 4,
            remaining_seconds: 6,
            targets: vec![TargetStatus {
                node_id: NodeId::new(5),
                active: true,
                remaining_seconds: 2,
            }],
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"state\":\"running\""));
        assert!(json.contains("\"node_id\":5"));

        let parsed: SessionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn idle_status_is_empty() {
        let status = SessionStatus::idle();
        assert_eq!(status.state, SchedulerState::Idle);
        assert_eq!(status.remaining_seconds, 0);
        assert!(status.targets.is_empty());
    }
}
