//! Catch policies decide what happens after a failed attempt.
//!
//! A policy sees the attempt count (1 on the first failure) and the failure
//! value, and answers with a [`Decision`]: retry after some delay, or stop.
//! Any `FnMut(u32, &E) -> Decision` closure is a policy; [`BoundedBackoff`]
//! is the preset exponential one. Closures returning a `(bool, Duration)`
//! pair go through [`with_catch_fn`](crate::with_catch_fn) instead.

pub mod backoff;

use std::marker::PhantomData;
use std::time::Duration;

pub use backoff::{bounded_backoff, BoundedBackoff};

/// The answer a catch policy gives for one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    retry: bool,
    delay: Duration,
}

impl Decision {
    /// Retry once `delay` has elapsed.
    pub fn retry_after(delay: Duration) -> Self {
        Self { retry: true, delay }
    }

    /// Retry immediately.
    pub fn retry_now() -> Self {
        Self::retry_after(Duration::ZERO)
    }

    /// Give up and hand the failure back to the caller.
    pub fn stop() -> Self {
        Self {
            retry: false,
            delay: Duration::ZERO,
        }
    }

    /// Returns true if the operation should be invoked again.
    pub fn should_retry(&self) -> bool {
        self.retry
    }

    /// How long to wait before the next attempt.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Splits the decision into its `(should_retry, delay)` pair.
    pub fn into_parts(self) -> (bool, Duration) {
        (self.retry, self.delay)
    }
}

impl From<(bool, Duration)> for Decision {
    fn from((retry, delay): (bool, Duration)) -> Self {
        Self { retry, delay }
    }
}

impl From<Decision> for (bool, Duration) {
    fn from(decision: Decision) -> Self {
        decision.into_parts()
    }
}

/// Decides whether a failed attempt is retried.
///
/// `attempt` is the number of failed invocations seen so far in the current
/// run, so it is 1 for the first failure. The policy is consulted exactly
/// once per failure and never after it has returned [`Decision::stop`].
pub trait CatchPolicy<E> {
    fn decide(&mut self, attempt: u32, error: &E) -> Decision;
}

impl<E, F> CatchPolicy<E> for F
where
    F: FnMut(u32, &E) -> Decision,
{
    fn decide(&mut self, attempt: u32, error: &E) -> Decision {
        self(attempt, error)
    }
}

/// Adapts a closure returning anything convertible into a [`Decision`].
pub(crate) struct PolicyFn<C, D> {
    policy: C,
    _decision: PhantomData<fn() -> D>,
}

impl<C, D> PolicyFn<C, D> {
    pub(crate) fn new(policy: C) -> Self {
        Self {
            policy,
            _decision: PhantomData,
        }
    }
}

impl<E, C, D> CatchPolicy<E> for PolicyFn<C, D>
where
    C: FnMut(u32, &E) -> D,
    D: Into<Decision>,
{
    fn decide(&mut self, attempt: u32, error: &E) -> Decision {
        (self.policy)(attempt, error).into()
    }
}
