//! The logger instance and its call surface

use crate::clock::{Clock, SystemClock};
use crate::record::LogRecord;
use crate::rotation::RotationState;
use crate::sink::AsyncSink;
use crate::supervisor::{self, SupervisedThread};
use crate::timer::RotationTimer;
use crate::{Level, LoggerConfig, Result, level};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::fmt;
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

struct Workers {
    writer: SupervisedThread,
    timer: RotationTimer,
}

/// Asynchronous file logger with daily rotation.
///
/// Calls format the line on the caller's thread and hand it to a bounded
/// queue; a single writer thread appends it to the file. Dropping the logger
/// closes it.
pub struct Logger {
    level: Level,
    clock: Arc<dyn Clock>,
    state: Arc<RotationState>,
    sink: AsyncSink,
    workers: Mutex<Option<Workers>>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("path", &self.state.path())
            .field("closed", &self.sink.is_closed())
            .finish()
    }
}

impl Logger {
    /// Boot a logger using the system clock
    pub fn boot(config: LoggerConfig) -> Result<Self> {
        Self::boot_with_clock(config, Arc::new(SystemClock))
    }

    /// Boot a logger that takes dates and timestamps from `clock`.
    ///
    /// Creates the directory if needed, opens the active file (rotating it
    /// first if it belongs to an earlier day) and starts the writer and
    /// timer threads.
    pub fn boot_with_clock(config: LoggerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let state = Arc::new(RotationState::open(
            &config.file_dir,
            &config.file_name,
            config.prefix.clone(),
            clock.clone(),
        )?);

        let (sink, drain) = AsyncSink::bounded(config.queue_capacity);
        let writer = {
            let state = state.clone();
            supervisor::spawn("daily-logger-writer", config.restart_limit, move || {
                drain.run(&state)
            })?
        };
        let timer = match RotationTimer::start(
            state.clone(),
            config.rotation_interval,
            config.restart_limit,
        ) {
            Ok(timer) => timer,
            Err(e) => {
                sink.close();
                writer.join();
                return Err(e);
            }
        };

        tracing::debug!(
            path = %state.path().display(),
            level = %config.level,
            day = %state.current_day(),
            "file logger booted"
        );

        Ok(Self {
            level: config.level,
            clock,
            state,
            sink,
            workers: Mutex::new(Some(Workers { writer, timer })),
        })
    }

    /// Configured minimum level
    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether a call at `level` would be emitted
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level::allowed(level, self.level)
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        self.state.path()
    }

    /// Day the active file belongs to
    pub fn current_day(&self) -> NaiveDate {
        self.state.current_day()
    }

    /// Log at trace level
    #[track_caller]
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, Location::caller(), args);
    }

    /// Log at info level
    #[track_caller]
    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, Location::caller(), args);
    }

    /// Log at warn level
    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, Location::caller(), args);
    }

    /// Log at error level
    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, Location::caller(), args);
    }

    /// Log without a level tag. Never filtered.
    #[track_caller]
    pub fn print(&self, args: fmt::Arguments<'_>) {
        self.sink
            .enqueue(LogRecord::render(self.clock.now(), None, Location::caller(), args));
    }

    /// Like [`print`](Self::print), terminating the message with a newline
    #[track_caller]
    pub fn println(&self, args: fmt::Arguments<'_>) {
        self.print(format_args!("{args}\n"));
    }

    /// Log at `level` on behalf of `location`.
    ///
    /// # Panics
    ///
    /// Panics if the logger has been closed.
    pub fn log(&self, level: Level, location: &Location<'_>, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.sink
            .enqueue(LogRecord::render(self.clock.now(), Some(level), location, args));
    }

    /// Like [`log`](Self::log), but returns [`Error::QueueClosed`](crate::Error::QueueClosed)
    /// instead of panicking once the logger has been closed.
    pub fn try_log(
        &self,
        level: Level,
        location: &Location<'_>,
        args: fmt::Arguments<'_>,
    ) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        self.sink
            .try_enqueue(LogRecord::render(self.clock.now(), Some(level), location, args))
    }

    pub(crate) fn try_print(
        &self,
        location: &Location<'_>,
        args: fmt::Arguments<'_>,
    ) -> Result<()> {
        self.sink
            .try_enqueue(LogRecord::render(self.clock.now(), None, location, args))
    }

    /// Block until everything logged so far has been written
    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }

    /// Rotate the file now, regardless of the date
    pub fn rotate(&self) -> Result<()> {
        self.state.rotate()
    }

    /// Rotate if the day has changed. Returns whether a rotation happened.
    pub fn ensure_fresh(&self) -> Result<bool> {
        self.state.ensure_fresh()
    }

    /// Shut down: stop the timer, write out the queue and close the file.
    ///
    /// Calling it again does nothing.
    pub fn close(&self) {
        let Some(Workers { writer, mut timer }) = self.workers.lock().take() else {
            return;
        };

        timer.stop();
        self.sink.close();
        writer.join();
        self.state.close();

        tracing::debug!(path = %self.state.path().display(), "file logger closed");
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.close();
    }
}
