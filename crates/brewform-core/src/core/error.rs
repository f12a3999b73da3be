use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or saving the brewform configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unable to determine home directory")]
    NoHomeDirectory,
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
