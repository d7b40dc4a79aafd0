//! Queue element and line rendering

use crate::Level;
use chrono::NaiveDateTime;
use std::fmt::{self, Write as _};
use std::panic::Location;
use std::path::Path;

/// Timestamp layout, local time with microseconds
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.6f";

/// A fully rendered log line waiting to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    rendered: String,
}

impl LogRecord {
    /// Wrap an already rendered line
    pub fn new(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
        }
    }

    /// Render `"{timestamp} [LEVEL] [file:line] message"`, or
    /// `"{timestamp} [file:line] message"` when `level` is `None`.
    pub fn render(
        now: NaiveDateTime,
        level: Option<Level>,
        location: &Location<'_>,
        args: fmt::Arguments<'_>,
    ) -> Self {
        let mut rendered = String::with_capacity(64);
        // Writing into a String cannot fail
        let _ = write!(rendered, "{}", now.format(TIMESTAMP_FORMAT));
        if let Some(level) = level {
            let _ = write!(rendered, " [{}]", level.tag());
        }
        let _ = write!(
            rendered,
            " [{}:{}] {}",
            file_base_name(location.file()),
            location.line(),
            args
        );
        Self { rendered }
    }

    /// The rendered text
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Consume the record, returning the rendered text
    pub fn into_string(self) -> String {
        self.rendered
    }
}

fn file_base_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}
