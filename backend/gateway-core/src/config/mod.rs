mod duration_format;

use crate::error::config::ConfigError;
use crate::listen::{DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy};
use crate::{DEFAULT_GATEWAY_HOST, DEFAULT_GATEWAY_PORT};

use common::ErrorLocation;
use models::{BindTarget, BindTargetBuilder, ModelError};

use std::collections::BTreeMap;
use std::env::var_os;
use std::fs::{create_dir_all, read_to_string, rename, write};
use std::io::ErrorKind;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;
const CONFIG_DIR_ENV: &str = "GATEWAY_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = "gateway";
const MAX_LISTEN_RETRIES: u32 = 16;
const HOME_PREFIX: &str = "~";

// ============================================
// ENUMS WITH DEFAULTS
// ============================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    #[default]
    Local,
    Remote,
}

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewaySettings {
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub mode: GatewayMode,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            port: default_port(),
            mode: GatewayMode::default(),
        }
    }
}

/// Retry budget for "address in use" at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenSettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Humantime string in the file, e.g. `"500ms"`.
    #[serde(default = "default_base_delay", with = "duration_format")]
    pub base_delay: Duration,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay: default_base_delay(),
        }
    }
}

/// Log verbosity for the gateway binary.
///
/// `level` unset means the build default (debug builds log at `Debug`,
/// release at `Info`). `modules` overrides it per log target, e.g.
/// `{"gateway_core::replay": "trace"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LevelFilter>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, LevelFilter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentDefaults {
    pub workspace: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentsConfig {
    #[serde(default)]
    pub defaults: AgentDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySettings,

    #[serde(default)]
    pub listen: ListenSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    #[serde(default)]
    pub agents: AgentsConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            gateway: GatewaySettings::default(),
            listen: ListenSettings::default(),
            logging: LoggingSettings::default(),
            agents: AgentsConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_bind_host() -> String {
    DEFAULT_GATEWAY_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_GATEWAY_PORT
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_base_delay() -> Duration {
    DEFAULT_BASE_DELAY
}

// ============================================
// IMPLEMENTATION
// ============================================

impl GatewayConfig {
    /// Directory holding `config.json` and `logs/`.
    ///
    /// `GATEWAY_CONFIG_DIR` wins; otherwise `<platform config dir>/gateway`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoConfigDir`] if neither is available.
    #[track_caller]
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        if let Some(dir) = var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME))
            .ok_or_else(|| ConfigError::NoConfigDir {
                message: format!("{CONFIG_DIR_ENV} is unset and the platform has no config dir"),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Read `<config_dir>/config.json`, falling back to defaults when the file
    /// does not exist. A file that exists must parse and validate.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE_NAME);

        let contents = match read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    message: format!("cannot read config: {e}"),
                    path,
                    location: ErrorLocation::from(Location::caller()),
                    source: e,
                });
            }
        };

        let config: GatewayConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Config at {} is not valid: {e}", path.display());
            ConfigError::Format {
                message: format!("cannot parse config: {e}"),
                path: path.clone(),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            }
        })?;

        config.validate()?;

        debug!("Config loaded from {}", path.display());
        Ok(config)
    }

    /// Validate, then write `<config_dir>/config.json` through a temp file
    /// and a rename, creating `config_dir` if needed.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] before anything is written, otherwise
    /// [`ConfigError::Io`] or [`ConfigError::Format`].
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        let path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Format {
            message: format!("cannot encode config: {e}"),
            path: path.clone(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        create_dir_all(config_dir)
            .and_then(|()| write(&temp_path, json))
            .and_then(|()| rename(&temp_path, &path))
            .map_err(|e| ConfigError::Io {
                message: format!("cannot write config: {e}"),
                path: path.clone(),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        info!("Config saved to {}", path.display());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let problem = if self.version == 0 || self.version > CONFIG_VERSION {
            Some(("version", format!("{} is not in 1..={CONFIG_VERSION}", self.version)))
        } else if self.gateway.bind_host.trim().is_empty() {
            Some(("gateway.bind_host", String::from("must not be empty")))
        } else if self.gateway.port == 0 {
            Some(("gateway.port", String::from("must be non-zero")))
        } else if self.listen.max_retries > MAX_LISTEN_RETRIES {
            Some((
                "listen.max_retries",
                format!("{} is not in 0..={MAX_LISTEN_RETRIES}", self.listen.max_retries),
            ))
        } else {
            None
        };

        match problem {
            Some((field, message)) => Err(ConfigError::Invalid {
                field,
                message,
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(()),
        }
    }

    /// Endpoint the gateway listens on.
    #[track_caller]
    pub fn bind_target(&self) -> Result<BindTarget, ModelError> {
        BindTargetBuilder::default()
            .with_host(self.gateway.bind_host.as_str())
            .with_port(self.gateway.port)
            .build()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.listen.max_retries, self.listen.base_delay)
    }

    /// Copy of this config set up for a local gateway rooted at `workspace_dir`.
    ///
    /// The workspace is stored with the home directory shortened to `~` so the
    /// file stays valid for another user or OS. Every other field is kept.
    pub fn with_local_workspace(&self, workspace_dir: &Path) -> Self {
        let home = dirs::home_dir();
        let mut config = self.clone();
        config.agents.defaults.workspace =
            Some(shorten_home_path(workspace_dir, home.as_deref()));
        config.gateway.mode = GatewayMode::Local;
        config
    }
}

/// Replace a leading `home` with `~`.
pub fn shorten_home_path(path: &Path, home: Option<&Path>) -> String {
    let relative = home
        .filter(|home| !home.as_os_str().is_empty())
        .and_then(|home| path.strip_prefix(home).ok());

    match relative {
        Some(rest) if rest.as_os_str().is_empty() => HOME_PREFIX.to_string(),
        Some(rest) => Path::new(HOME_PREFIX).join(rest).display().to_string(),
        None => path.display().to_string(),
    }
}
