//! Session scheduler for rangemaster
//!
//! This crate turns an exercise timeline into target commands:
//! - Active set computation and diffing (pure, per tick)
//! - Session state machine (Idle -> Running -> Ending -> Idle)
//! - Fire-and-forget dispatch with per-command timeouts
//! - The async scheduler task and its handle

mod dispatch;
mod engine;
mod error;
mod events;
mod scheduler;
mod session;
mod snapshot;
pub mod tracker;

pub use dispatch::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use scheduler::*;
pub use session::*;
pub use snapshot::*;
pub use tracker::{ActiveSet, ActiveSetDiff};
