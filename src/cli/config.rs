// ABOUTME: Configuration management for kompoze
// ABOUTME: Handles loading configuration from files and environment variable overrides

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Delimiter pair as `left:right`, used when `--delims` is not given
    #[serde(default)]
    pub delimiters: Option<String>,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_definitions: usize,

    #[serde(default = "default_fail_fast")]
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_fail_fast() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            delimiters: None,
            max_concurrent_definitions: default_max_concurrent(),
            fail_fast: default_fail_fast(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.merge_env()?;
        Ok(config)
    }

    fn load_file(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => match Self::find_config_file() {
                Some(p) => p,
                None => return Ok(Config::default()),
            },
        };

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {}: {}", config_path.display(), e)
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut possible_paths = vec![
            PathBuf::from("kompoze.yaml"),
            PathBuf::from("kompoze.yml"),
            PathBuf::from(".kompoze.yaml"),
            PathBuf::from(".kompoze.yml"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            possible_paths.push(home_dir.join(".kompoze").join("config.yaml"));
        }

        possible_paths.into_iter().find(|path| path.exists())
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("KOMPOZE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("KOMPOZE_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(delims) = std::env::var("KOMPOZE_DELIMS") {
            self.delimiters = Some(delims);
        }
        if let Ok(max) = std::env::var("KOMPOZE_MAX_CONCURRENT") {
            self.max_concurrent_definitions = max.parse().map_err(|e| {
                anyhow::anyhow!("Invalid KOMPOZE_MAX_CONCURRENT value '{}': {}", max, e)
            })?;
        }

        Ok(())
    }
}
