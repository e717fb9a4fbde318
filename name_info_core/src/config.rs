use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV: &str = "NAME_INFO_CONFIG_PATH";

/// Plugin settings, read from JSON. Missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub is_enabled: bool,
    pub debug: bool,
    /// Directory holding the persisted custom-info file. Never created.
    pub config_dir: PathBuf,
    pub dedup_window_ms: u64,
    pub max_nickname_chars: usize,
    /// Characters the ambient observer strips from the front of a command.
    pub command_prefixes: Vec<char>,
    pub console_color: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            is_enabled: true,
            debug: false,
            config_dir: PathBuf::from("configs"),
            dedup_window_ms: 5_000,
            max_nickname_chars: 32,
            command_prefixes: vec!['.'],
            console_color: "yellow".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PluginConfigError {
    #[error("failed to parse plugin config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read plugin config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PluginConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, PluginConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| PluginConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let config = PluginConfig::from_json_str(&contents)?;
        Ok(config)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }

    pub fn with_config_dir(mut self, config_dir: impl Into<PathBuf>) -> Self {
        self.config_dir = config_dir.into();
        self
    }
}

/// Loads the config named by `NAME_INFO_CONFIG_PATH`, or the defaults when
/// the variable is unset or the file cannot be used.
pub fn load_plugin_config_from_env() -> (PluginConfig, Option<PathBuf>) {
    let Some(path) = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from) else {
        tracing::info!(
            target: "name_info::config",
            "plugin_config.loaded=builtin"
        );
        return (PluginConfig::default(), None);
    };
    load_plugin_config(&path)
}

pub fn load_plugin_config(path: &Path) -> (PluginConfig, Option<PathBuf>) {
    match PluginConfig::from_file(path) {
        Ok(config) => {
            tracing::info!(
                target: "name_info::config",
                path = %path.display(),
                "plugin_config.loaded=file"
            );
            (config, Some(path.to_path_buf()))
        }
        Err(err) => {
            tracing::warn!(
                target: "name_info::config",
                path = %path.display(),
                error = %err,
                "plugin_config.load_failed"
            );
            (PluginConfig::default(), None)
        }
    }
}
