//! Error and fault types.
//!
//! The crate keeps two failure channels apart. Expected failures are the
//! operation's own `Err(E)` values and never pass through this module.
//! Abnormal terminations are panics, carried around as a [`Fault`] payload
//! until they are re-raised. Errors owned by the crate itself (loading
//! [`RetrySettings`](crate::settings::RetrySettings)) are [`SettingsError`].

use std::any::Any;

use thiserror::Error;

/// A captured panic payload, as returned by `std::panic::catch_unwind`.
pub type Fault = Box<dyn Any + Send + 'static>;

/// Signal handed to the finally hook when a `run_async` future is dropped
/// before it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cancelled;

/// Errors that can occur when loading retry settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file was not found.
    #[error("settings file not found: {0}")]
    FileNotFound(String),

    /// The settings path is not valid UTF-8.
    #[error("invalid settings path: {0}")]
    InvalidPath(String),

    /// The layered configuration could not be built or deserialized.
    #[error("failed to load settings: {0}")]
    Config(#[from] config::ConfigError),

    /// An in-memory TOML document could not be parsed.
    #[error("failed to parse settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Renders a panic payload for diagnostics.
///
/// `panic!` with a literal produces a `&'static str` payload and a formatted
/// `panic!` produces a `String`. Anything else (e.g. `std::panic::panic_any`
/// with a custom type) has no textual form.
pub fn describe_fault(fault: &(dyn Any + Send)) -> &str {
    if let Some(message) = fault.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = fault.downcast_ref::<String>() {
        message.as_str()
    } else if fault.is::<Cancelled>() {
        "cancelled"
    } else {
        "<non-string panic payload>"
    }
}
