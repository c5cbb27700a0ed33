//! Time utilities for rangemaster
//!
//! Session progress is measured on the monotonic clock so wall-clock
//! adjustments during an exercise never move targets. The monotonic clock is
//! tokio's, which means it can be paused and advanced in tests.
//! Wall-clock time is kept only for display and logging.

use chrono::{DateTime, Local};
use std::time::Duration;

/// Get the current local time.
pub fn now() -> DateTime<Local> {
    chrono::Local::now()
}

/// Format a DateTime for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Represents a point in monotonic time for session progress.
/// This is immune to wall-clock changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(tokio::time::Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(tokio::time::Instant::now())
    }

    /// Duration since `earlier`, or zero if `earlier` is later than `self`
    pub fn duration_since(&self, earlier: MonotonicInstant) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicInstant(self.0 + rhs)
    }
}

/// Whole seconds contained in `d`, rounded down
pub fn whole_seconds(d: Duration) -> u64 {
    d.as_secs()
}

/// Format a countdown in seconds as `M:SS` (or `H:MM:SS` past an hour)
pub fn format_countdown(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
