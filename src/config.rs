use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::data::GBIF_API_URL;
use crate::errors::ConfigError;

/// GBIF serves at most this many occurrences per search page.
pub const GBIF_PAGE_LIMIT: usize = 300;

/// Settings for the occurrence fetch.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base URL of the GBIF REST API, without a trailing slash.
    pub api_url: String,
    /// Maximum number of occurrence records requested per search.
    pub record_limit: usize,
    /// Restrict results to `basisOfRecord=HUMAN_OBSERVATION`.
    pub human_observation_only: bool,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_url: GBIF_API_URL.to_string(),
            record_limit: 500,
            human_observation_only: false,
            timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("species-mapper").join("config.toml"))
    }

    /// Loads the config file if it exists; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let mut config: FetchConfig = toml::from_str(text)?;
        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    /// Loads the user config, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), ?config, "loaded fetch config");
                config
            }
            Err(e) => {
                tracing::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }
}
