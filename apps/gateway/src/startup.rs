//! Startup wiring: config directory, config, and the listening socket.

use crate::error::GatewayError;

use gateway_core::config::GatewayConfig;
use gateway_core::listen::holder::find_port_holder;
use gateway_core::listen::{TcpBinder, gateway_endpoint, listen_with_retry};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use tokio::net::TcpListener;
use tokio::task::spawn_blocking;

const LOG_DIR_NAME: &str = "logs";

/// Config directory for this process.
///
/// # Errors
///
/// Returns [`GatewayError::Core`] if no config directory can be determined.
pub fn resolve_config_dir() -> Result<PathBuf, GatewayError> {
    // Runs before the logger exists; main reports the error
    GatewayConfig::default_dir().map_err(|e| GatewayError::core(e))
}

/// `<config_dir>/logs`, created if missing.
///
/// # Errors
///
/// Returns [`GatewayError::Gateway`] if the directory cannot be created.
pub fn prepare_log_dir(config_dir: &Path) -> Result<PathBuf, GatewayError> {
    let log_dir = config_dir.join(LOG_DIR_NAME);

    create_dir_all(&log_dir).map_err(|e| GatewayError::Gateway {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(log_dir)
}

/// # Errors
///
/// Returns [`GatewayError::Core`] if the config file exists but cannot be read or is invalid.
pub fn load_config(config_dir: &Path) -> Result<GatewayConfig, GatewayError> {
    GatewayConfig::load(config_dir).map_err(|e| {
        error!("Failed to load config: {e}");
        GatewayError::core(e)
    })
}

/// Bind the gateway socket described by `config`, retrying while a
/// predecessor still holds the port.
///
/// On a lock conflict the process holding the port is looked up and logged
/// before returning.
///
/// # Errors
///
/// - [`GatewayError::Lock`] if the port stayed in use for the whole retry budget
/// - [`GatewayError::Core`] for an invalid bind target or any other bind failure
pub async fn bind_gateway(config: &GatewayConfig) -> Result<TcpListener, GatewayError> {
    let target = config.bind_target().map_err(|e| {
        error!("Invalid gateway endpoint in config: {e}");
        GatewayError::core(e)
    })?;
    let policy = config.retry_policy();

    info!(
        "Binding {} (max retries {}, base delay {:?})",
        gateway_endpoint(&target),
        policy.max_retries,
        policy.base_delay
    );

    match listen_with_retry(&TcpBinder, &target, &policy).await {
        Ok(listener) => Ok(listener),
        Err(err) => {
            error!("{err}");
            if err.is_lock_conflict() {
                report_port_holder(target.port()).await;
            }
            Err(GatewayError::from_listen(err))
        }
    }
}

async fn report_port_holder(port: u16) {
    match spawn_blocking(move || find_port_holder(port)).await {
        Ok(Ok(Some(holder))) => warn!("Port {port} is held by {holder}"),
        Ok(Ok(None)) => debug!("Could not identify the process holding port {port}"),
        Ok(Err(e)) => debug!("Port holder lookup failed: {e}"),
        Err(e) => debug!("Port holder lookup task failed: {e}"),
    }
}
