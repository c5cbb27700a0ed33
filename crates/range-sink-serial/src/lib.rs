//! Serial line command sink for rangemaster
//!
//! Provides:
//! - The ASCII line protocol understood by the target controller
//! - Opening and discovering serial devices
//! - A `CommandSink` that simulates sends while no port is open

mod port;
mod protocol;
mod sink;

pub use port::*;
pub use protocol::*;
pub use sink::*;
