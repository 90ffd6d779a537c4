//! Bounded exponential backoff preset.

use std::time::Duration;

use super::{CatchPolicy, Decision};

/// A catch policy that retries with exponentially growing delays until a
/// fixed number of failures has been seen.
///
/// With `max_attempts = n` the operation is invoked at most `n` times, so the
/// policy grants `n - 1` retries. The failure value is not inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedBackoff {
    /// Number of failed attempts after which the run gives up.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for each subsequent one.
    pub base_delay: Duration,
}

impl Default for BoundedBackoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl BoundedBackoff {
    /// Creates a backoff policy with the given bound and base delay.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Calculates the delay that follows failure number `attempt`.
    ///
    /// The delay is `base_delay * 2^(attempt - 1)`, so the first retry waits
    /// exactly `base_delay`. Saturates at `Duration::MAX`.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.base_delay;
        }

        let exponent = (attempt - 1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(Duration::MAX)
    }

    /// Returns true while failure number `attempt` is still below the bound.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl<E> CatchPolicy<E> for BoundedBackoff {
    fn decide(&mut self, attempt: u32, _error: &E) -> Decision {
        if self.should_retry(attempt) {
            Decision::retry_after(self.calculate_delay(attempt))
        } else {
            Decision::stop()
        }
    }
}

/// Builds a [`BoundedBackoff`] policy, ready to pass to
/// [`with_catch`](crate::with_catch).
pub fn bounded_backoff(max_attempts: u32, base_delay: Duration) -> BoundedBackoff {
    BoundedBackoff::new(max_attempts, base_delay)
}
