//! Waiting for a transfer task to leave the `ACTIVE` state.

use std::time::Duration;

use log::{info, warn};

use crate::error::PublishError;

use super::{TaskStatus, TransferApi};

/// Delay between two status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How long to keep polling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollOptions {
    /// `None` or zero polls until the task finishes.
    pub timeout: Option<Duration>,
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::indefinite()
    }
}

impl PollOptions {
    pub fn indefinite() -> Self {
        Self {
            timeout: None,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_timeout_secs(seconds: u64) -> Self {
        Self {
            timeout: Some(Duration::from_secs(seconds)),
            interval: POLL_INTERVAL,
        }
    }

    /// Number of status checks allowed, or `None` for no limit.
    ///
    /// A non-zero timeout shorter than one interval still allows one check.
    pub fn max_polls(&self) -> Option<u64> {
        let timeout = self.timeout.filter(|timeout| !timeout.is_zero())?;
        let interval = self.interval.as_millis().max(1);
        let polls = timeout.as_millis() / interval;
        Some(u64::try_from(polls).unwrap_or(u64::MAX).max(1))
    }
}

/// How polling ended.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    /// The task reached a non-`ACTIVE` status.
    Finished(TaskStatus),
    /// The poll budget ran out; the task was still `ACTIVE` at the last check.
    TimedOut(TaskStatus),
}

impl PollOutcome {
    pub fn status(&self) -> &TaskStatus {
        match self {
            PollOutcome::Finished(status) | PollOutcome::TimedOut(status) => status,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, PollOutcome::Finished(_))
    }
}

/// Polls a task until it is no longer `ACTIVE` or the budget is spent.
///
/// Running out of budget is not an error: the last observed status is
/// returned as [`PollOutcome::TimedOut`]. `sleep` is called between checks.
pub fn wait_for_transfer<A, S>(
    api: &A,
    task_id: &str,
    options: &PollOptions,
    mut sleep: S,
) -> Result<PollOutcome, PublishError>
where
    A: TransferApi + ?Sized,
    S: FnMut(Duration),
{
    let mut remaining = options.max_polls();
    let mut checks: u64 = 0;

    loop {
        let status = TaskStatus::from_entity(api.get_task_status(task_id)?)?;
        checks += 1;
        info!(
            "Transfer {task_id} status after {checks} check(s): {}",
            status.status()
        );

        if !status.is_active() {
            return Ok(PollOutcome::Finished(status));
        }

        if let Some(left) = remaining.as_mut() {
            *left -= 1;
            if *left == 0 {
                warn!("Stopped waiting for transfer {task_id}; it is still {}", status.status());
                return Ok(PollOutcome::TimedOut(status));
            }
        }

        sleep(options.interval);
    }
}
