//! Unified path management for proctor configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/proctor/           # Config directory (PROCTOR_CONFIG_DIR overrides)
//! ├── settings.toml            # Exam, backend and session settings
//! └── logs/                    # Application logs
//!     └── proctor.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "PROCTOR_CONFIG_DIR";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for proctor.
pub struct ProctorPaths;

impl ProctorPaths {
    /// Returns the proctor configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: `$PROCTOR_CONFIG_DIR` if set, else e.g. `~/.config/proctor/`
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join("proctor"))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the settings file.
    pub fn settings_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("settings.toml"))
    }

    /// Returns the logs directory.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
