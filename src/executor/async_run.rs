use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures::FutureExt;
use tracing::debug;

use super::{Attempts, FinallyGuard};
use crate::error::describe_fault;
use crate::options::{Catcher, RunOption, RunOptions};

/// Async counterpart of [`run`](super::run).
///
/// The delay between attempts is a `tokio::time::sleep`, so this must be
/// polled inside a tokio runtime whenever the policy asks for a non-zero
/// delay. Panics raised while polling the operation or while sleeping are
/// handled exactly like in [`run`](super::run).
///
/// The options are assembled when this function is called, not when the
/// future is first polled. If the returned future is dropped before it
/// completes, including before it was ever polled, the finally hook runs with
/// [`Cancelled`](crate::Cancelled) as its signal.
pub fn run_async<'a, T, E, F, Fut, I>(
    operation: F,
    options: I,
) -> impl Future<Output = Result<T, E>> + 'a
where
    T: 'a,
    E: 'a,
    F: FnMut() -> Fut + 'a,
    Fut: Future<Output = Result<T, E>> + 'a,
    I: IntoIterator<Item = RunOption<'a, E>>,
{
    let (catcher, finally) = options
        .into_iter()
        .collect::<RunOptions<'a, E>>()
        .into_parts();
    drive(operation, catcher, FinallyGuard::new(finally))
}

async fn drive<'a, T, E, F, Fut>(
    mut operation: F,
    mut catcher: Catcher<'a, E>,
    guard: FinallyGuard<'a>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let outcome = AssertUnwindSafe(async {
        let mut attempts = Attempts::new();
        loop {
            let error = match operation().await {
                Ok(value) => {
                    attempts.succeeded();
                    return Ok(value);
                }
                Err(error) => error,
            };

            let Some(delay) = attempts.failed(&mut catcher, &error) else {
                return Err(error);
            };
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    })
    .catch_unwind()
    .await;

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
