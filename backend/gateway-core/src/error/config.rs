use common::ErrorLocation;

use std::io::Error as IoError;
use std::path::{Path, PathBuf};

use thiserror::Error as ThisError;

/// Failures reading, checking or writing `config.json`.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    /// Filesystem failure on the config file, its temp file or its directory.
    #[error("Config Io Error: {message} ({}) {location}", .path.display())]
    Io {
        message: String,
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    /// The file is not valid JSON for [`GatewayConfig`](crate::config::GatewayConfig),
    /// or the config could not be encoded.
    #[error("Config Format Error: {message} ({}) {location}", .path.display())]
    Format {
        message: String,
        path: PathBuf,
        location: ErrorLocation,
        #[source]
        source: serde_json::Error,
    },

    #[error("Config Dir Error: {message} {location}")]
    NoConfigDir {
        message: String,
        location: ErrorLocation,
    },

    /// Parsed, but a value is out of range.
    #[error("Config Validation Error: {field}: {message} {location}")]
    Invalid {
        field: &'static str,
        message: String,
        location: ErrorLocation,
    },
}

impl ConfigError {
    /// File the error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } | ConfigError::Format { path, .. } => Some(path),
            ConfigError::NoConfigDir { .. } | ConfigError::Invalid { .. } => None,
        }
    }
}
