//! Core events emitted by the scheduler

use chrono::{DateTime, Local};
use range_api::{EndReason, TargetCommand};
use range_util::{ExerciseId, NodeId, RunId};

/// Events emitted by the engine and scheduler
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// Session started
    SessionStarted {
        run_id: RunId,
        exercise_id: ExerciseId,
        name: String,
        total_seconds: u64,
        started_at: DateTime<Local>,
    },

    /// The active set changed on a tick
    TargetsChanged {
        run_id: RunId,
        elapsed_seconds: u64,
        activated: Vec<NodeId>,
        deactivated: Vec<NodeId>,
    },

    /// Timer cancelled, deactivation sweep starting
    SessionEnding {
        run_id: RunId,
        reason: EndReason,
        elapsed_seconds: u64,
        /// Nodes still live when the sweep began
        sweep: Vec<NodeId>,
    },

    /// Session torn down, scheduler idle
    SessionEnded {
        run_id: RunId,
        reason: EndReason,
        elapsed_seconds: u64,
    },

    /// A target command failed
    DispatchFailed {
        run_id: Option<RunId>,
        command: TargetCommand,
        error: String,
    },
}
