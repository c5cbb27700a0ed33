//! Timeline model: the immutable description of one exercise

use range_util::{ExerciseId, NodeId};
use serde::Serialize;
use thiserror::Error;

/// Why a session definition was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSession {
    #[error("Total duration must be greater than zero")]
    ZeroDuration,

    #[error("Window {index} for node {node_id}: start {start}s must be before end {end}s")]
    EmptyWindow {
        index: usize,
        node_id: NodeId,
        start: u64,
        end: u64,
    },

    #[error("Window {index} for node {node_id}: end {end}s exceeds session duration {total}s")]
    WindowExceedsDuration {
        index: usize,
        node_id: NodeId,
        end: u64,
        total: u64,
    },
}

/// Physical target descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRef {
    /// Bus address of the target controller
    pub node_id: NodeId,

    /// Distance from the firing line, in meters
    pub distance: f64,

    /// Which target face graphic is mounted
    pub image_num: u32,
}

impl TargetRef {
    pub fn new(node_id: NodeId, distance: f64, image_num: u32) -> Self {
        Self {
            node_id,
            distance,
            image_num,
        }
    }

    /// Asset path of the target face graphic, for presentation layers
    pub fn image_path(&self) -> String {
        format!("assets/ShootingTarget_graphics{}.png", self.image_num)
    }
}

/// Time span during which a target is live
///
/// The span is half-open: live at `start_seconds`, down again at `end_seconds`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivationWindow {
    pub target: TargetRef,
    pub start_seconds: u64,
    pub end_seconds: u64,
}

impl ActivationWindow {
    pub fn new(target: TargetRef, start_seconds: u64, end_seconds: u64) -> Self {
        Self {
            target,
            start_seconds,
            end_seconds,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.target.node_id
    }

    /// Whether the window covers `elapsed_seconds`
    pub fn contains(&self, elapsed_seconds: u64) -> bool {
        elapsed_seconds >= self.start_seconds && elapsed_seconds < self.end_seconds
    }

    fn check(&self, index: usize, total: u64) -> Result<(), InvalidSession> {
        if self.start_seconds >= self.end_seconds {
            return Err(InvalidSession::EmptyWindow {
                index,
                node_id: self.node_id(),
                start: self.start_seconds,
                end: self.end_seconds,
            });
        }
        if self.end_seconds > total {
            return Err(InvalidSession::WindowExceedsDuration {
                index,
                node_id: self.node_id(),
                end: self.end_seconds,
                total,
            });
        }
        Ok(())
    }
}

/// A validated exercise timeline
///
/// Fields are private so a `Session` can only exist in a valid shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    id: ExerciseId,
    name: String,
    total_duration_seconds: u64,
    windows: Vec<ActivationWindow>,
}

impl Session {
    pub fn new(
        id: impl Into<ExerciseId>,
        name: impl Into<String>,
        total_duration_seconds: u64,
        windows: Vec<ActivationWindow>,
    ) -> Result<Self, InvalidSession> {
        if total_duration_seconds == 0 {
            return Err(InvalidSession::ZeroDuration);
        }

        for (index, window) in windows.iter().enumerate() {
            window.check(index, total_duration_seconds)?;
        }

        Ok(Self {
            id: id.into(),
            name: name.into(),
            total_duration_seconds,
            windows,
        })
    }

    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.total_duration_seconds
    }

    pub fn windows(&self) -> &[ActivationWindow] {
        &self.windows
    }

    /// Distinct nodes referenced by any window, ascending
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.windows.iter().map(|w| w.node_id()).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
