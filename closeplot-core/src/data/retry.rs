//! Bounded retry state machine with an injectable sleeper.
//!
//! ```text
//! Attempting(1) ──data──▶ Succeeded
//!      │ empty/error
//!      ▼ (sleep)
//! Attempting(2) ── ... ──▶ Attempting(max) ──empty──▶ ExhaustedEmpty
//!                                          └─error──▶ ExhaustedError
//! ```
//!
//! There is no sleep after the final attempt.

use std::time::Duration;

/// Attempt budget and fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// What a single attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Data,
    Empty,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to run attempt `n` (1-based).
    Attempting(u32),
    Succeeded,
    ExhaustedEmpty,
    ExhaustedError,
}

impl RetryState {
    pub fn start() -> Self {
        RetryState::Attempting(1)
    }

    /// Transition after an attempt. Terminal states are absorbing.
    pub fn advance(self, outcome: AttemptOutcome, policy: &RetryPolicy) -> Self {
        let RetryState::Attempting(n) = self else {
            return self;
        };
        match outcome {
            AttemptOutcome::Data => RetryState::Succeeded,
            _ if n < policy.max_attempts => RetryState::Attempting(n + 1),
            AttemptOutcome::Empty => RetryState::ExhaustedEmpty,
            AttemptOutcome::Failed => RetryState::ExhaustedError,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, RetryState::Attempting(_))
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
