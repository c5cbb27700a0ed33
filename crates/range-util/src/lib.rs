//! Shared utilities for rangemaster
//!
//! This crate provides:
//! - ID types (NodeId, RunId, ExerciseId)
//! - Time utilities (monotonic time, countdown formatting)
//! - Default paths for the configuration file and serial port

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
