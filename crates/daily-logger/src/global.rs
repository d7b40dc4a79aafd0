//! Process-wide default logger
//!
//! A convenience wrapper around one shared [`Logger`]. Calls made before any
//! logger is installed are dropped. Calls made after [`close`] are dropped
//! too, but each one is reported as a `tracing` error.

use crate::{Error, Level, Logger, LoggerConfig, Result};
use arc_swap::ArcSwapOption;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

static DEFAULT: ArcSwapOption<Logger> = ArcSwapOption::const_empty();

/// Set by [`close`], cleared by [`install`].
static CLOSED: AtomicBool = AtomicBool::new(false);

/// Boot a logger from `config` and make it the default.
///
/// A previously installed default logger is closed.
pub fn boot(config: LoggerConfig) -> Result<()> {
    let logger = Logger::boot(config)?;
    install(Arc::new(logger));
    Ok(())
}

/// Make `logger` the default, closing the one it replaces
pub fn install(logger: Arc<Logger>) {
    CLOSED.store(false, Ordering::Release);
    if let Some(previous) = DEFAULT.swap(Some(logger)) {
        previous.close();
    }
}

/// The current default logger, if any
pub fn logger() -> Option<Arc<Logger>> {
    DEFAULT.load_full()
}

/// Remove and close the default logger. Does nothing if none is installed.
///
/// Later calls through this module are reported as errors until a new
/// logger is installed.
pub fn close() {
    if let Some(logger) = DEFAULT.swap(None) {
        CLOSED.store(true, Ordering::Release);
        logger.close();
    }
}

fn emit(level: Level, location: &Location<'_>, args: fmt::Arguments<'_>) {
    match DEFAULT.load_full() {
        Some(logger) => {
            if let Err(e) = logger.try_log(level, location, args) {
                report_dropped(location, &e);
            }
        }
        None => report_if_closed(location),
    }
}

fn report_if_closed(location: &Location<'_>) {
    if CLOSED.load(Ordering::Acquire) {
        report_dropped(location, &Error::Closed);
    }
}

fn report_dropped(location: &Location<'_>, error: &Error) {
    tracing::error!(
        caller = %location,
        error = %error,
        "log record dropped after the default logger was closed"
    );
}

/// Log at trace level through the default logger
#[track_caller]
pub fn trace(args: fmt::Arguments<'_>) {
    emit(Level::Trace, Location::caller(), args);
}

/// Log at info level through the default logger
#[track_caller]
pub fn info(args: fmt::Arguments<'_>) {
    emit(Level::Info, Location::caller(), args);
}

/// Log at warn level through the default logger
#[track_caller]
pub fn warn(args: fmt::Arguments<'_>) {
    emit(Level::Warn, Location::caller(), args);
}

/// Log at error level through the default logger
#[track_caller]
pub fn error(args: fmt::Arguments<'_>) {
    emit(Level::Error, Location::caller(), args);
}

/// Log without a level tag through the default logger
#[track_caller]
pub fn print(args: fmt::Arguments<'_>) {
    let location = Location::caller();
    match DEFAULT.load_full() {
        Some(logger) => {
            if let Err(e) = logger.try_print(location, args) {
                report_dropped(location, &e);
            }
        }
        None => report_if_closed(location),
    }
}

/// Like [`print`], terminating the message with a newline
#[track_caller]
pub fn println(args: fmt::Arguments<'_>) {
    print(format_args!("{args}\n"));
}
