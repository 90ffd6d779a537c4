//! Backoff settings loaded from configuration files.
//!
//! Lets an application keep its retry bounds in a TOML file instead of in
//! code, with environment variables layered on top:
//!
//! ```toml
//! max_attempts = 5
//! base_delay_ms = 250
//! ```
//!
//! Delays are stored in whole milliseconds. Converting a [`BoundedBackoff`]
//! rounds its base delay down to the millisecond and clamps it to `u64::MAX`.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::policy::BoundedBackoff;

/// Environment prefix used by [`RetrySettings::load`].
pub const ENV_PREFIX: &str = "RETRYCATCH";

/// Serializable form of a [`BoundedBackoff`] policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Failed attempts after which the run gives up.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let backoff = BoundedBackoff::default();
        Self {
            max_attempts: backoff.max_attempts,
            base_delay_ms: saturating_millis(backoff.base_delay),
        }
    }
}

/// Whole milliseconds in `duration`, clamped to `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl RetrySettings {
    /// Load settings from a TOML file with `RETRYCATCH__*` overrides.
    ///
    /// `RETRYCATCH__MAX_ATTEMPTS=5` overrides `max_attempts`, and so on.
    /// Keys missing from both sources keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - The path is not valid UTF-8
    /// - The file or an override cannot be parsed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use retrycatch::settings::RetrySettings;
    ///
    /// let settings = RetrySettings::load("config/retry.toml")?;
    /// let policy = settings.backoff();
    /// # Ok::<(), retrycatch::SettingsError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    /// Same as [`RetrySettings::load`] with a custom environment prefix.
    pub fn load_with_prefix<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, SettingsError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| SettingsError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(SettingsError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::with_name(path_str))
            // Double underscore separates the prefix from the key
            .add_source(
                Environment::with_prefix(prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Parse settings from an in-memory TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(source)?)
    }

    /// Delay before the first retry.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Build the backoff policy these settings describe.
    pub fn backoff(&self) -> BoundedBackoff {
        BoundedBackoff::new(self.max_attempts, self.base_delay())
    }
}

impl From<BoundedBackoff> for RetrySettings {
    fn from(backoff: BoundedBackoff) -> Self {
        Self {
            max_attempts: backoff.max_attempts,
            base_delay_ms: saturating_millis(backoff.base_delay),
        }
    }
}
