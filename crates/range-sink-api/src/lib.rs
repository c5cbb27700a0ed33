//! Command sink trait interfaces for rangemaster
//!
//! This crate defines the boundary between the session scheduler and the
//! transport that reaches physical targets. It contains no transport code
//! itself, only the trait and a recording mock for tests.

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
