//! Configuration for lgfallback

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::policy::LocalePolicy;
use crate::resource::DEFAULT_EXTENSION;

/// How `render` picks the engine for a locale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Probe the locale variants of a base resource
    #[default]
    Candidates,
    /// Use the per-bucket entry resource
    Entry,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for resources
    pub resources: PathBuf,

    /// Resource file extension
    pub extension: String,

    /// Dispatch strategy used by `render`
    pub strategy: Strategy,

    /// Base resource for the candidates strategy
    pub base: Option<String>,

    /// Entry resource prefix for the entry strategy
    pub entry: Option<String>,

    /// Fail instead of returning empty output when rendering fails
    pub strict: bool,

    /// Treat missing template variables as template errors
    #[serde(rename = "strict-templates")]
    pub strict_templates: bool,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Explicit locale -> fallback chain map; built-in chains otherwise
    pub policy: Option<LocalePolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resources: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            strategy: Strategy::default(),
            base: None,
            entry: None,
            strict: false,
            strict_templates: false,
            log_level: None,
            policy: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: ./lgfallback.yml
        let local_config = PathBuf::from("lgfallback.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/lgfallback/lgfallback.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("lgfallback").join("lgfallback.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// The configured policy, or the built-in one
    pub fn policy(&self) -> LocalePolicy {
        self.policy.clone().unwrap_or_default()
    }
}
