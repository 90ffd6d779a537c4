//! The retry loop.
//!
//! [`run`] invokes an operation until it succeeds or the catch policy stops
//! it, then runs the finally hook. A panic from the operation or the policy
//! ends the loop at once. The hook receives the payload, and then the same
//! payload is re-raised to the caller with `resume_unwind`. [`run_async`] is
//! the same loop with a `tokio` sleep between attempts.
//!
//! If the finally hook itself panics while a panic is already being passed
//! through, the hook's panic is the one that reaches the caller and the
//! original payload is dropped.

mod async_run;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use tracing::{debug, trace};

pub use async_run::run_async;

use crate::error::{describe_fault, Cancelled};
use crate::options::{Catcher, FinallyHook, RunOption, RunOptions};
use crate::settings::saturating_millis;

/// Runs `operation`, retrying failures as the configured catch policy allows.
///
/// Returns the first `Ok` value, or the failure the policy declined to retry.
/// Without a catch policy the operation runs exactly once. The finally hook,
/// if any, runs exactly once before this function returns or unwinds.
///
/// # Panics
///
/// Re-raises any panic from the operation or the catch policy, after the
/// finally hook has seen it.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use retrycatch::{bounded_backoff, run, with_catch, with_finally};
///
/// let mut calls = 0;
/// let result = run(
///     || {
///         calls += 1;
///         if calls < 3 { Err("not yet") } else { Ok(calls) }
///     },
///     [
///         with_catch(bounded_backoff(5, Duration::from_millis(1))),
///         with_finally(|signal| assert!(signal.is_none())),
///     ],
/// );
/// assert_eq!(result, Ok(3));
/// ```
pub fn run<'a, T, E, F, I>(mut operation: F, options: I) -> Result<T, E>
where
    E: 'a,
    F: FnMut() -> Result<T, E>,
    I: IntoIterator<Item = RunOption<'a, E>>,
{
    let (mut catcher, finally) = options
        .into_iter()
        .collect::<RunOptions<'a, E>>()
        .into_parts();
    let guard = FinallyGuard::new(finally);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<T, E> {
        let mut attempts = Attempts::new();
        loop {
            let error = match operation() {
                Ok(value) => {
                    attempts.succeeded();
                    return Ok(value);
                }
                Err(error) => error,
            };

            let delay = attempts.failed(&mut catcher, &error).ok_or(error)?;
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }));

    match outcome {
        Ok(result) => {
            guard.fire(None);
            result
        }
        Err(fault) => {
            debug!(fault = describe_fault(&*fault), "operation panicked");
            guard.fire(Some(&*fault));
            panic::resume_unwind(fault)
        }
    }
}

/// Attempt bookkeeping shared by the blocking and async loops.
pub(crate) struct Attempts {
    count: u32,
}

impl Attempts {
    pub(crate) fn new() -> Self {
        Self { count: 0 }
    }

    pub(crate) fn succeeded(&self) {
        trace!(attempt = self.count.saturating_add(1), "operation succeeded");
    }

    /// Records a failure and consults the policy.
    ///
    /// Returns the delay before the next attempt, or `None` if the run stops.
    pub(crate) fn failed<E>(
        &mut self,
        catcher: &mut Catcher<'_, E>,
        error: &E,
    ) -> Option<Duration> {
        self.count = self.count.saturating_add(1);
        let decision = catcher.decide(self.count, error);

        if decision.should_retry() {
            debug!(
                attempt = self.count,
                delay_ms = saturating_millis(decision.delay()),
                "operation failed, retrying"
            );
            Some(decision.delay())
        } else {
            debug!(attempt = self.count, "operation failed, giving up");
            None
        }
    }
}

/// Owns the finally hook and guarantees it runs once.
///
/// The normal exits call [`FinallyGuard::fire`]. If the guard is dropped
/// without firing, which only happens when a `run_async` future is dropped
/// before it completes, the hook receives [`Cancelled`].
pub(crate) struct FinallyGuard<'a> {
    hook: Option<FinallyHook<'a>>,
}

impl<'a> FinallyGuard<'a> {
    pub(crate) fn new(hook: Option<FinallyHook<'a>>) -> Self {
        Self { hook }
    }

    pub(crate) fn fire(mut self, signal: Option<&(dyn Any + Send)>) {
        if let Some(hook) = self.hook.take() {
            hook(signal);
        }
    }
}

impl Drop for FinallyGuard<'_> {
    fn drop(&mut self) {
        if let Some(hook) = self.hook.take() {
            debug!("run dropped before completion");
            hook(Some(&Cancelled));
        }
    }
}
