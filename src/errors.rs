use std::path::PathBuf;

use thiserror::Error;

/// Why a species search produced no occurrence table.
///
/// Every failure of the fetch pipeline lands here as a value; the view layer
/// matches on the variant to pick the message shown in place of the map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("No species named '{name}' was found. Check the spelling of the scientific name.")]
    NotFound { name: String },
    #[error("Could not reach the occurrence service: {0}")]
    Transport(String),
    #[error("The occurrence service returned unexpected data: {0}")]
    Decode(String),
    #[error("'{name}' has no occurrence records with coordinates.")]
    EmptyResult { name: String },
    #[error("The search worker stopped before producing a result.")]
    Worker,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Raised when a fetched table is too thin to summarise or plot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("No {field} data is available for this species.")]
    NoData { field: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
