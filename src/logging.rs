//! Subscriber setup for the crate's diagnostics.
//!
//! The executor reports through `tracing` under the `retrycatch` target:
//! successful attempts at `TRACE`, retries, give-ups and caught panics at
//! `DEBUG`. Nothing is emitted until a subscriber is installed, either by
//! the application or with [`init_logging`].

use tracing_subscriber::{fmt, EnvFilter};

/// Target the executor's events are recorded under.
pub const LOG_TARGET: &str = "retrycatch";

/// Verbosity of the crate's diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Every attempt, including successes
    Trace,
    /// Retry decisions and caught panics
    Debug,
    /// Nothing from the executor; other crates at info
    #[default]
    Info,
    /// Disable logging entirely
    Off,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Off => "off",
        }
    }
}

impl From<u8> for LogLevel {
    /// 0 = Info, 1 = Debug, 2+ = Trace
    fn from(verbosity: u8) -> Self {
        match verbosity {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Configuration for [`init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Level applied to the `retrycatch` target
    pub level: LogLevel,
    /// Whether to include timestamps
    pub with_timestamps: bool,
    /// Whether to include thread IDs
    pub with_thread_ids: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_timestamps: true,
            with_thread_ids: false,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.with_timestamps = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// Create a configuration from a verbosity level (0 = info, 1 = debug, 2+ = trace).
    pub fn from_verbosity(verbosity: u8) -> Self {
        Self::default().with_level(LogLevel::from(verbosity))
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn directive(&self) -> String {
        match self.level {
            LogLevel::Off => "off".to_string(),
            level => format!("info,{}={}", LOG_TARGET, level.as_str()),
        }
    }
}

/// Install a stderr `fmt` subscriber for the crate's events.
///
/// `RUST_LOG` takes precedence over the configured level. Returns false if a
/// global subscriber was already installed, in which case nothing changes.
///
/// # Examples
///
/// ```no_run
/// use retrycatch::logging::{init_logging, LogLevel, LoggingConfig};
///
/// init_logging(LoggingConfig::new().with_level(LogLevel::Debug));
/// ```
pub fn init_logging(config: LoggingConfig) -> bool {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(config.directive())
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_thread_ids(config.with_thread_ids);

    if config.with_timestamps {
        subscriber.try_init().is_ok()
    } else {
        subscriber.without_time().try_init().is_ok()
    }
}

/// Install the default subscriber (info level, timestamps, stderr).
pub fn init_default_logging() -> bool {
    init_logging(LoggingConfig::default())
}
