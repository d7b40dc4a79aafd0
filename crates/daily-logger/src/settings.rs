//! Loading [`LoggerConfig`] from a TOML settings file
//!
//! The logger settings live in a `[logs]` table:
//!
//! ```toml
//! [logs]
//! fileDir = "/var/log/app"
//! filename = "app.log"
//! prefix = "[app] "
//! level = "warn"
//! ```
//!
//! Missing keys fall back to their defaults.

use crate::{Error, LoggerConfig, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    logs: LoggerConfig,
}

/// Parse the `[logs]` table out of TOML text
pub fn from_toml_str(text: &str) -> Result<LoggerConfig> {
    let file: SettingsFile = toml::from_str(text)?;
    Ok(file.logs)
}

/// Read and parse a settings file
pub fn load(path: impl AsRef<Path>) -> Result<LoggerConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::ReadSettings {
        path: path.to_path_buf(),
        source,
    })?;
    from_toml_str(&text)
}

/// Like [`load`], but a missing or malformed file is reported and the
/// defaults are used instead.
pub fn load_or_default(path: impl AsRef<Path>) -> LoggerConfig {
    let path = path.as_ref();
    match load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "using default logger settings");
            LoggerConfig::default()
        }
    }
}
