//! Shared domain types for rangemaster
//!
//! This crate defines the types every other crate agrees on:
//! - The timeline model (sessions, activation windows, target descriptors)
//! - Target commands sent to the hardware sink
//! - Scheduler state and the status view handed to presentation layers

mod timeline;
mod types;

pub use timeline::*;
pub use types::*;
