//! Error types for devkit-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or narrowing the fleet config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse fleet config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("fleet config not found at {path}")]
    NotFound { path: PathBuf },

    /// A bundle selector was not of the form `owner::repository`.
    #[error("invalid bundle selector '{selector}'; expected <owner>::<repository>")]
    InvalidSelector { selector: String },

    /// An organization or repository key cannot be used as a directory name.
    #[error("invalid name '{name}' in fleet config at {path}; expected a single path segment")]
    InvalidName { path: PathBuf, name: String },
}
