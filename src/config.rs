//! Application configuration.
//!
//! Read from `<config_dir>/coursetrack/config.json`; a missing or malformed
//! file yields the defaults. Environment variables override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::progress::DEFAULT_STORAGE_KEY;

const APP_DIR: &str = "coursetrack";
const CONFIG_FILE: &str = "config.json";

pub const ENV_DATA_DIR: &str = "COURSETRACK_DATA_DIR";
pub const ENV_CHAPTERS_DIR: &str = "COURSETRACK_CHAPTERS_DIR";
pub const ENV_SAMPLE_INTERVAL: &str = "COURSETRACK_SAMPLE_INTERVAL_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where progress is persisted
    pub data_dir: PathBuf,
    /// Where `<video-id>.txt` descriptions are read from
    pub chapters_dir: PathBuf,
    pub sample_interval_secs: u64,
    pub storage_key: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self {
            chapters_dir: data_dir.join("chapters"),
            data_dir,
            sample_interval_secs: 1,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Self {
        let config = match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if let Ok(content) = std::fs::read_to_string(path) {
            match serde_json::from_str::<Config>(&content) {
                Ok(config) => return config.normalized(),
                Err(e) => log::warn!("Ignoring malformed config {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
    }

    /// Apply overrides looked up through `lookup` (the environment in production)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_CHAPTERS_DIR).filter(|v| !v.is_empty()) {
            self.chapters_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_SAMPLE_INTERVAL) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => self.sample_interval_secs = secs,
                Err(_) => log::warn!("Ignoring {}={:?}: not a number of seconds", ENV_SAMPLE_INTERVAL, raw),
            }
        }
        self.normalized()
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.sample_interval_secs.max(1))
    }

    fn normalized(mut self) -> Self {
        self.sample_interval_secs = self.sample_interval_secs.max(1);
        if self.storage_key.trim().is_empty() {
            self.storage_key = DEFAULT_STORAGE_KEY.to_string();
        }
        self
    }
}
