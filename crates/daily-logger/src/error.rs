//! Error types for the daily file logger

use std::io;
use std::path::PathBuf;

/// Result type for logger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while booting, rotating or writing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to create the log directory
    #[error("failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to open or create the active log file
    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        /// The file that could not be opened
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to move the active file to its dated name
    #[error("failed to rotate {from} to {to}: {source}")]
    Rotation {
        /// The active file
        from: PathBuf,
        /// The archive name it was being renamed to
        to: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to append a line to the active file
    #[error("failed to write to {path}: {source}")]
    Write {
        /// The active file
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// No file is currently open, the line was dropped
    #[error("no log file is open at {0}")]
    NoActiveFile(PathBuf),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failed to read a settings file
    #[error("failed to read settings file {path}: {source}")]
    ReadSettings {
        /// The settings file
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to parse a settings file
    #[error("failed to parse settings: {0}")]
    ParseSettings(#[from] toml::de::Error),

    /// The queue was closed before the record could be enqueued
    #[error("failed to enqueue log record: queue closed")]
    QueueClosed,

    /// The logger has been shut down
    #[error("logger is closed")]
    Closed,

    /// Failed to spawn a background thread
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name
        name: String,
        /// The underlying error
        source: io::Error,
    },
}
