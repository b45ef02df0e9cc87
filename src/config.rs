//! Where timekeeper keeps its files.
//!
//! The default vault lives in the user's config directory
//! (`~/.config/timekeeper` on Linux). It holds project files created without
//! an explicit vault, plus the registry index `lookup.json`.
//!
//! The location can be overridden with `TIMEKEEPER_HOME` (or `--home` on the
//! command line).

use std::path::PathBuf;

use crate::error::{Result, TimekeeperError};

const APP_NAME: &str = "timekeeper";

/// File name of the registry index inside the default vault.
pub const INDEX_FILENAME: &str = "lookup.json";

/// Environment variable overriding the default vault directory.
pub const HOME_ENV: &str = "TIMEKEEPER_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Default vault; also the directory holding the registry index.
    pub home: PathBuf,
}

impl Config {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// Resolve the default vault from `TIMEKEEPER_HOME`, falling back to the
    /// platform config directory.
    pub fn from_env() -> Result<Self> {
        if let Ok(home) = std::env::var(HOME_ENV) {
            if !home.is_empty() {
                return Ok(Self::new(home));
            }
        }
        Ok(Self::new(default_home()?))
    }

    pub fn index_path(&self) -> PathBuf {
        self.home.join(INDEX_FILENAME)
    }
}

fn default_home() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| {
        TimekeeperError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine config directory",
        ))
    })?;
    path.push(APP_NAME);
    Ok(path)
}
