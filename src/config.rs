use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::{mistake_stats, time_stats};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_time_min_attempts")]
    pub time_min_attempts: u32,
    #[serde(default = "default_mistake_min_attempts")]
    pub mistake_min_attempts: u32,
    #[serde(default = "default_mistake_max_results")]
    pub mistake_max_results: usize,
    /// Average response time in seconds above which an item is reported even
    /// when its mistake rate is acceptable. Unset means rate-only reporting.
    #[serde(default)]
    pub slow_time_threshold: Option<f64>,
    /// Override for the stats directory; unset means the platform data dir.
    #[serde(default)]
    pub data_dir: Option<String>,
}

fn default_time_min_attempts() -> u32 {
    time_stats::DEFAULT_MIN_ATTEMPTS
}
fn default_mistake_min_attempts() -> u32 {
    mistake_stats::DEFAULT_MIN_ATTEMPTS
}
fn default_mistake_max_results() -> usize {
    mistake_stats::DEFAULT_MAX_RESULTS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_min_attempts: default_time_min_attempts(),
            mistake_min_attempts: default_mistake_min_attempts(),
            mistake_max_results: default_mistake_max_results(),
            slow_time_threshold: None,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chordr")
            .join("config.toml")
    }
}
