//! Logger configuration

use crate::{Error, Level, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 5000;

/// Default interval between idle rotation checks
pub const DEFAULT_ROTATION_INTERVAL: Duration = Duration::from_secs(30);

/// Default number of restarts granted to a panicking background thread
pub const DEFAULT_RESTART_LIMIT: u32 = 3;

/// Resolved logger settings. Immutable once the logger is booted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Directory holding the active and rotated files, created if absent
    #[serde(alias = "fileDir")]
    pub file_dir: PathBuf,
    /// Base name of the active file
    #[serde(alias = "filename", alias = "fileName")]
    pub file_name: String,
    /// Literal text prepended to every written line
    pub prefix: String,
    /// Minimum level for leveled calls
    pub level: Level,
    /// Capacity of the bounded queue
    #[serde(alias = "queueCapacity")]
    pub queue_capacity: usize,
    /// Interval between rotation checks made while idle
    #[serde(with = "duration_secs", alias = "rotationInterval")]
    pub rotation_interval: Duration,
    /// Restarts granted to the writer and timer threads after a panic
    #[serde(alias = "restartLimit")]
    pub restart_limit: u32,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            file_dir: PathBuf::from("logs"),
            file_name: "app.log".to_string(),
            prefix: String::new(),
            level: Level::Info,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            rotation_interval: DEFAULT_ROTATION_INTERVAL,
            restart_limit: DEFAULT_RESTART_LIMIT,
        }
    }
}

impl LoggerConfig {
    /// Create a builder seeded with defaults
    pub fn builder() -> LoggerConfigBuilder {
        LoggerConfigBuilder::default()
    }

    /// Full path of the active file
    pub fn file_path(&self) -> PathBuf {
        self.file_dir.join(&self.file_name)
    }

    /// Reject settings the logger cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(Error::Configuration("file_name must not be empty".into()));
        }
        if self.queue_capacity == 0 {
            return Err(Error::Configuration("queue_capacity must be at least 1".into()));
        }
        if self.rotation_interval.is_zero() {
            return Err(Error::Configuration("rotation_interval must be non-zero".into()));
        }
        Ok(())
    }
}

/// Builder for [`LoggerConfig`]
#[derive(Debug, Clone, Default)]
pub struct LoggerConfigBuilder {
    config: LoggerConfig,
}

impl LoggerConfigBuilder {
    /// Set the log directory
    pub fn file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.file_dir = dir.into();
        self
    }

    /// Set the active file name
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    /// Set the line prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the minimum level
    pub fn level(mut self, level: impl Into<Level>) -> Self {
        self.config.level = level.into();
        self
    }

    /// Set the queue capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the idle rotation check interval
    pub fn rotation_interval(mut self, interval: Duration) -> Self {
        self.config.rotation_interval = interval;
        self
    }

    /// Set the restart budget for background threads
    pub fn restart_limit(mut self, limit: u32) -> Self {
        self.config.restart_limit = limit;
        self
    }

    /// Build the configuration
    pub fn build(self) -> LoggerConfig {
        self.config
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
