//! Bounded completion polling
//!
//! TWI hardware reports completion through a flag that software spins on.
//! A wiring fault or a missing pull-up means the flag never rises, so every
//! spin loop here is bounded by a [`PollLimit`] instead of running forever.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::TwiError;

/// Default number of completion polls before a primitive gives up
///
/// One byte at 100 kHz takes about 90 µs, a few hundred iterations of a
/// register poll loop at 16 MHz.
pub const DEFAULT_POLL_ITERATIONS: u32 = 100_000;

/// Upper bound on how often a condition is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PollLimit {
    /// Poll until the condition holds, however long it takes
    Unbounded,
    /// Give up after this many unsuccessful polls
    Iterations(u32),
}

impl Default for PollLimit {
    fn default() -> Self {
        PollLimit::Iterations(DEFAULT_POLL_ITERATIONS)
    }
}

/// Remaining polls of a single wait
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    remaining: Option<u32>,
}

impl PollBudget {
    /// Start a fresh budget
    pub const fn new(limit: PollLimit) -> Self {
        Self {
            remaining: match limit {
                PollLimit::Unbounded => None,
                PollLimit::Iterations(n) => Some(n),
            },
        }
    }

    /// Account for one unsuccessful poll
    ///
    /// Returns [`TwiError::Timeout`] once the budget is used up.
    pub fn tick(&mut self) -> Result<(), TwiError> {
        match self.remaining {
            None => Ok(()),
            Some(0) => Err(TwiError::Timeout),
            Some(n) => {
                self.remaining = Some(n - 1);
                Ok(())
            }
        }
    }

    /// Polls left, `None` when unbounded
    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }
}

/// Spin until `ready` returns true or the limit is exhausted
pub fn poll_until<F>(limit: PollLimit, mut ready: F) -> Result<(), TwiError>
where
    F: FnMut() -> bool,
{
    let mut budget = PollBudget::new(limit);
    loop {
        if ready() {
            return Ok(());
        }
        budget.tick()?;
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_counts_down() {
        let mut budget = PollBudget::new(PollLimit::Iterations(2));
        assert_eq!(budget.tick(), Ok(()));
        assert_eq!(budget.tick(), Ok(()));
        assert_eq!(budget.tick(), Err(TwiError::Timeout));
        assert_eq!(budget.remaining(), Some(0));
    }

    #[test]
    fn test_unbounded_budget_never_expires() {
        let mut budget = PollBudget::new(PollLimit::Unbounded);
        for _ in 0..10_000 {
            assert_eq!(budget.tick(), Ok(()));
        }
        assert_eq!(budget.remaining(), None);
    }

    #[test]
    fn test_poll_until_ready() {
        let mut calls = 0;
        let result = poll_until(PollLimit::Iterations(10), || {
            calls += 1;
            calls == 4
        });
        assert_eq!(result, Ok(()));
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_poll_until_times_out() {
        let mut calls = 0;
        let result = poll_until(PollLimit::Iterations(3), || {
            calls += 1;
            false
        });
        assert_eq!(result, Err(TwiError::Timeout));
        // Initial check plus one per remaining poll
        assert_eq!(calls, 4);
    }
}
