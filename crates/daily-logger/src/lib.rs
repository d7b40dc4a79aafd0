//! Asynchronous file logger with daily rotation
//!
//! This crate provides a process-wide file sink that:
//! - Accepts log lines from any number of threads through a bounded queue
//! - Writes them from a single background thread, in queue order
//! - Rotates the file once per local calendar day (or on demand), renaming
//!   the previous file to `<name>.<YYYY-MM-DD>`
//! - Checks for a day change on a timer, so idle files still roll over
//!
//! ```no_run
//! use daily_logger::{Logger, LoggerConfig};
//!
//! let logger = Logger::boot(
//!     LoggerConfig::builder()
//!         .file_dir("/var/log/app")
//!         .file_name("app.log")
//!         .level("warn")
//!         .build(),
//! )?;
//! logger.warn(format_args!("disk usage at {}%", 91));
//! logger.close();
//! # Ok::<(), daily_logger::Error>(())
//! ```

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod level;
mod logger;
mod macros;
mod record;

pub mod clock;
pub mod global;
pub mod rotation;
pub mod settings;
pub mod sink;
pub mod supervisor;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    DEFAULT_QUEUE_CAPACITY, DEFAULT_RESTART_LIMIT, DEFAULT_ROTATION_INTERVAL, LoggerConfig,
    LoggerConfigBuilder,
};
pub use error::{Error, Result};
pub use level::{Level, allowed};
pub use logger::Logger;
pub use record::{LogRecord, TIMESTAMP_FORMAT};
pub use rotation::{DATE_FORMAT, RotationState};
pub use sink::{AsyncSink, Drain};
pub use timer::RotationTimer;
