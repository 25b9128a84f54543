//! TOML settings storage.
//!
//! Settings are read once at session start. Writes go through a temporary
//! file, fsync and an atomic rename so a crash never leaves a half-written
//! `settings.toml` behind.

use crate::paths::ProctorPaths;
use proctor_core::config::ProctorConfig;
use proctor_core::error::{ProctorError, Result};
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// Environment variable overriding `backend.url`.
pub const BACKEND_URL_ENV: &str = "PROCTOR_BACKEND_URL";
/// Environment variable overriding `exam.exam_id`.
pub const EXAM_ID_ENV: &str = "PROCTOR_EXAM_ID";

/// File-backed store for [`ProctorConfig`].
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    /// Store at the default location (`~/.config/proctor/settings.toml`).
    pub fn new() -> Result<Self> {
        let path = ProctorPaths::settings_file().map_err(|e| ProctorError::config(e.to_string()))?;
        Ok(Self { path })
    }

    /// Store at an explicit path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file as written, without environment overrides.
    ///
    /// A missing or empty file yields the defaults.
    pub fn load_file(&self) -> Result<ProctorConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[TomlSettingsStore] {:?} not found, using defaults",
                self.path
            );
            return Ok(ProctorConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ProctorConfig::default());
        }
        Ok(toml::from_str(&content)?)
    }

    /// Loads settings and applies environment overrides.
    pub fn load(&self) -> Result<ProctorConfig> {
        let mut config = self.load_file()?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    /// Saves settings atomically.
    pub fn save(&self, config: &ProctorConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let toml_string = toml::to_string_pretty(config)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        tracing::info!("[TomlSettingsStore] Saved settings to {:?}", self.path);
        Ok(())
    }

    /// Writes the defaults unless a settings file already exists.
    ///
    /// Returns whether a file was created.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&ProctorConfig::default())?;
        Ok(true)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| ProctorError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| ProctorError::io("Path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

fn apply_env_overrides<F>(config: &mut ProctorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(BACKEND_URL_ENV) {
        tracing::debug!("[TomlSettingsStore] backend.url overridden from environment");
        config.backend.url = url;
    }
    if let Some(exam_id) = lookup(EXAM_ID_ENV).filter(|v| !v.trim().is_empty()) {
        config.exam.exam_id = exam_id;
    }
}
