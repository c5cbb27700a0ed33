//! Scheduler error types

use range_api::InvalidSession;
use range_util::RunId;
use thiserror::Error;

/// Errors returned to callers of the scheduler
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid session: {0}")]
    InvalidSession(#[from] InvalidSession),

    #[error("A session is already running (run {run_id})")]
    AlreadyRunning { run_id: RunId },

    #[error("Scheduler task has stopped")]
    SchedulerStopped,
}

pub type CoreResult<T> = Result<T, CoreError>;
