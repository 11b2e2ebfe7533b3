//! User configuration at `<home>/.projsync/config.yaml`.
//!
//! Every field is optional; a missing file yields [`Config::default`]. The CLI
//! layers flags and environment variables on top of these values.
//!
//! Like the rest of the crate, each loader has an `_at(home)` form used by
//! tests and a no-arg wrapper that resolves `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::manifest::DEFAULT_MANIFEST_NAMES;

/// Default bound on concurrent probes and remote calls.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default HTTP timeout for visibility probes and catalog calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub catalog_url: Option<String>,
    pub token: Option<String>,
    pub concurrency: Option<usize>,
    pub probe_timeout_secs: Option<u64>,
    pub manifest_names: Option<Vec<String>>,
}

impl Config {
    /// Effective concurrency, never below 1.
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.probe_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn manifest_names(&self) -> Vec<String> {
        match &self.manifest_names {
            Some(names) if !names.is_empty() => names.clone(),
            _ => DEFAULT_MANIFEST_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `<home>/.projsync/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".projsync").join("config.yaml")
}

/// Load the config file below `home`, or defaults if it does not exist.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
        path: path.clone(),
        source: e,
    })?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}
