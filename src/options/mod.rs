//! Run configuration and the option constructors that assemble it.
//!
//! A run is configured by an ordered list of [`RunOption`] values, each of
//! which sets one field of [`RunOptions`]. Options do nothing until they are
//! applied, and a later option replaces an earlier one for the same field.
//! Both fields are optional: without a catch policy a run never retries, and
//! without a finally hook nothing runs after it.
//!
//! A [`RunOptions`] built with its `with_*` methods is itself an iterator of
//! options, so it can be handed to [`run`](crate::run) directly.

use std::any::Any;
use std::iter::Chain;
use std::option;

use crate::policy::{CatchPolicy, Decision, PolicyFn};

pub(crate) type BoxedPolicy<'a, E> = Box<dyn CatchPolicy<E> + 'a>;

/// Hook invoked once after a run, with the panic payload if the run panicked.
pub type FinallyHook<'a> = Box<dyn FnOnce(Option<&(dyn Any + Send)>) + 'a>;

/// The assembled configuration of one run.
pub struct RunOptions<'a, E> {
    catch: Option<BoxedPolicy<'a, E>>,
    finally: Option<FinallyHook<'a>>,
}

impl<E> Default for RunOptions<'_, E> {
    fn default() -> Self {
        Self {
            catch: None,
            finally: None,
        }
    }
}

impl<E> std::fmt::Debug for RunOptions<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunOptions")
            .field("catch", &self.catch.as_ref().map(|_| "<policy>"))
            .field("finally", &self.finally.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

impl<'a, E: 'a> RunOptions<'a, E> {
    /// Creates an empty configuration: never retry, no finally hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the catch policy.
    pub fn with_catch<P>(mut self, policy: P) -> Self
    where
        P: CatchPolicy<E> + 'a,
    {
        self.catch = Some(Box::new(policy));
        self
    }

    /// Sets a closure as the catch policy.
    ///
    /// See [`with_catch_fn`].
    pub fn with_catch_fn<C, D>(self, policy: C) -> Self
    where
        C: FnMut(u32, &E) -> D + 'a,
        D: Into<Decision> + 'a,
    {
        self.with_catch(PolicyFn::new(policy))
    }

    /// Sets the finally hook.
    pub fn with_finally<H>(mut self, hook: H) -> Self
    where
        H: FnOnce(Option<&(dyn Any + Send)>) + 'a,
    {
        self.finally = Some(Box::new(hook));
        self
    }

    /// Applies one option on top of the current configuration.
    pub fn apply(mut self, option: RunOption<'a, E>) -> Self {
        (option.0)(&mut self);
        self
    }

    /// Returns true if a catch policy is configured.
    pub fn has_catch(&self) -> bool {
        self.catch.is_some()
    }

    /// Returns true if a finally hook is configured.
    pub fn has_finally(&self) -> bool {
        self.finally.is_some()
    }

    pub(crate) fn into_parts(self) -> (Catcher<'a, E>, Option<FinallyHook<'a>>) {
        (Catcher(self.catch), self.finally)
    }
}

impl<'a, E: 'a> FromIterator<RunOption<'a, E>> for RunOptions<'a, E> {
    fn from_iter<I: IntoIterator<Item = RunOption<'a, E>>>(options: I) -> Self {
        options.into_iter().fold(Self::new(), Self::apply)
    }
}

impl<'a, E: 'a> IntoIterator for RunOptions<'a, E> {
    type Item = RunOption<'a, E>;
    type IntoIter = Chain<option::IntoIter<RunOption<'a, E>>, option::IntoIter<RunOption<'a, E>>>;

    /// Splits the configuration back into one option per field that is set.
    fn into_iter(self) -> Self::IntoIter {
        let catch = self.catch.map(RunOption::set_catch);
        let finally = self.finally.map(RunOption::set_finally);
        catch.into_iter().chain(finally)
    }
}

/// The catch policy of a run, or its absence.
pub(crate) struct Catcher<'a, E>(Option<BoxedPolicy<'a, E>>);

impl<E> Catcher<'_, E> {
    /// Consults the policy; a missing policy always stops.
    pub(crate) fn decide(&mut self, attempt: u32, error: &E) -> Decision {
        match self.0.as_mut() {
            Some(policy) => policy.decide(attempt, error),
            None => Decision::stop(),
        }
    }
}

/// One deferred change to a [`RunOptions`].
pub struct RunOption<'a, E>(Box<dyn FnOnce(&mut RunOptions<'a, E>) + 'a>);

impl<'a, E: 'a> RunOption<'a, E> {
    fn set_catch(policy: BoxedPolicy<'a, E>) -> Self {
        RunOption(Box::new(move |options: &mut RunOptions<'a, E>| {
            options.catch = Some(policy);
        }))
    }

    fn set_finally(hook: FinallyHook<'a>) -> Self {
        RunOption(Box::new(move |options: &mut RunOptions<'a, E>| {
            options.finally = Some(hook);
        }))
    }
}

impl<E> std::fmt::Debug for RunOption<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RunOption(..)")
    }
}

/// Option that sets the catch policy consulted after each failure.
pub fn with_catch<'a, E, P>(policy: P) -> RunOption<'a, E>
where
    E: 'a,
    P: CatchPolicy<E> + 'a,
{
    RunOption::set_catch(Box::new(policy))
}

/// Option that sets a closure as the catch policy.
///
/// Unlike [`with_catch`], the closure's parameter types are inferred, and it
/// may return anything convertible into a [`Decision`], such as the
/// `(retry, delay)` pair.
///
/// ```
/// use std::time::Duration;
/// use retrycatch::{run, with_catch_fn};
///
/// let result: Result<(), &str> = run(
///     || Err("busy"),
///     [with_catch_fn(|attempt, _| (attempt < 2, Duration::ZERO))],
/// );
/// assert_eq!(result, Err("busy"));
/// ```
pub fn with_catch_fn<'a, E, C, D>(policy: C) -> RunOption<'a, E>
where
    E: 'a,
    C: FnMut(u32, &E) -> D + 'a,
    D: Into<Decision> + 'a,
{
    with_catch(PolicyFn::new(policy))
}

/// Option that sets the hook run once after the operation concludes.
pub fn with_finally<'a, E, H>(hook: H) -> RunOption<'a, E>
where
    E: 'a,
    H: FnOnce(Option<&(dyn Any + Send)>) + 'a,
{
    RunOption::set_finally(Box::new(hook))
}
