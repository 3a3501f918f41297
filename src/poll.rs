//! Bounded polling of long-running service operations.
//!
//! Both remote services answer an analyse request with `202 Accepted` and an
//! `Operation-Location` URL that must be polled until the operation reaches a
//! terminal state. [`poll_until`] drives that loop for any status source, so
//! the backoff policy lives in one place and can be tested without a network.
//!
//! Terminal states are explicit: a check returns [`PollStatus::Succeeded`] or
//! [`PollStatus::Failed`]; [`PollStatus::Running`] keeps polling until the
//! policy's attempt or wall-clock budget runs out, which surfaces as
//! [`ServiceError::TimedOut`].

use crate::error::ServiceError;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;

/// What a single status check observed.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus<T> {
    /// The operation finished and produced a value.
    Succeeded(T),
    /// The operation finished unsuccessfully.
    Failed(String),
    /// Still running; wait per the policy and check again.
    Running,
    /// The server throttled us and asked for a specific delay.
    RetryAfter(Duration),
}

/// Operation state as reported in a status document's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl OperationState {
    /// Parse a service status string. Services differ in casing
    /// (`succeeded` vs `Succeeded`), so the match is case-insensitive.
    /// Unknown values are treated as still running.
    pub fn parse(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "notstarted" => OperationState::NotStarted,
            "succeeded" => OperationState::Succeeded,
            "failed" => OperationState::Failed,
            "canceled" | "cancelled" => OperationState::Canceled,
            _ => OperationState::Running,
        }
    }
}

/// How the delay between checks evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same delay every time.
    Fixed,
    /// Doubling delay, capped at `max`.
    Exponential { max: Duration },
}

/// Budget and pacing for a polling loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay before the second check.
    pub interval: Duration,
    pub backoff: Backoff,
    /// Maximum number of status checks.
    pub max_attempts: u32,
    /// Overall wall-clock budget.
    pub timeout: Duration,
}

impl PollPolicy {
    /// Fixed-interval polling, bounded by attempts.
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            backoff: Backoff::Fixed,
            max_attempts: max_attempts.max(1),
            timeout: interval.saturating_mul(max_attempts.max(1)) + interval,
        }
    }

    /// Exponential polling, bounded by wall-clock time.
    pub fn exponential(initial: Duration, max: Duration, timeout: Duration) -> Self {
        Self {
            interval: initial,
            backoff: Backoff::Exponential { max },
            max_attempts: u32::MAX,
            timeout,
        }
    }

    /// Document analysis: 2 s doubling to 60 s, at most 5 minutes.
    pub fn document_analysis() -> Self {
        Self::exponential(
            Duration::from_secs(2),
            Duration::from_secs(60),
            Duration::from_secs(300),
        )
    }

    /// Image analysis and analyzer creation: every 2 s, 60 checks.
    pub fn image_analysis() -> Self {
        Self::fixed(Duration::from_secs(2), 60)
    }

    fn next_delay(&self, current: Duration) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential { max } => current.saturating_mul(2).min(max),
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::document_analysis()
    }
}

/// Call `check` until it reports a terminal state or the policy's budget is
/// exhausted. `check` receives the 1-indexed attempt number.
pub async fn poll_until<T, F, Fut>(policy: &PollPolicy, mut check: F) -> Result<T, ServiceError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollStatus<T>, ServiceError>>,
{
    let start = Instant::now();
    let mut delay = policy.interval;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let wait = match check(attempt).await? {
            PollStatus::Succeeded(value) => {
                debug!("Operation succeeded after {} polls", attempt);
                return Ok(value);
            }
            PollStatus::Failed(reason) => return Err(ServiceError::OperationFailed(reason)),
            PollStatus::Running => {
                let current = delay;
                delay = policy.next_delay(delay);
                current
            }
            PollStatus::RetryAfter(after) => after,
        };

        if attempt >= policy.max_attempts || start.elapsed() + wait > policy.timeout {
            return Err(ServiceError::TimedOut {
                attempts: attempt,
                elapsed_ms: start.elapsed().as_millis() as u64,
            });
        }

        sleep(wait).await;
    }
}
