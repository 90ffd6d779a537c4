//! retrycatch - retry a fallible operation with catch and finally hooks
//!
//! [`run`] invokes an operation, asks a catch policy what to do after each
//! failure, and always runs a finally hook at the end. Panics are not
//! retried: the hook sees the payload and the panic then continues to the
//! caller.
//!
//! ```
//! use std::time::Duration;
//! use retrycatch::{bounded_backoff, run, with_catch};
//!
//! let mut remaining_failures = 2;
//! let result = run(
//!     || {
//!         if remaining_failures > 0 {
//!             remaining_failures -= 1;
//!             Err("unavailable")
//!         } else {
//!             Ok("connected")
//!         }
//!     },
//!     [with_catch(bounded_backoff(3, Duration::from_millis(1)))],
//! );
//! assert_eq!(result, Ok("connected"));
//! ```

pub mod error;
pub mod executor;
pub mod logging;
pub mod options;
pub mod policy;
pub mod settings;

pub use error::{describe_fault, Cancelled, Fault, SettingsError};
pub use executor::{run, run_async};
pub use options::{with_catch, with_catch_fn, with_finally, FinallyHook, RunOption, RunOptions};
pub use policy::{bounded_backoff, BoundedBackoff, CatchPolicy, Decision};
pub use settings::RetrySettings;
