//! Error types for sentinel-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the file path attached.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required value was not provided by any layer.
    #[error("missing required setting '{key}' (set {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },

    /// A value was provided but is unusable.
    #[error("invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}
