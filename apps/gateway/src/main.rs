use gateway::error::GatewayError;
use gateway::logger::initialize as LoggerInitialize;
use gateway::startup::{bind_gateway, load_config, prepare_log_dir, resolve_config_dir};

use gateway_core::GATEWAY_WS_SCHEME;

use common::ErrorLocation;

use std::panic::Location;
use std::process::ExitCode;

use log::{LevelFilter, error, info};
use tokio::signal::ctrl_c;

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if log::max_level() == LevelFilter::Off {
                eprintln!("{e}");
            } else {
                error!("Gateway failed to start: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), GatewayError> {
    let config_dir = resolve_config_dir()?;
    let log_dir = prepare_log_dir(&config_dir)?;

    // Levels come from config, so nothing before this point is logged
    let config = load_config(&config_dir)?;
    LoggerInitialize(&log_dir, &config.logging)?;

    info!("Gateway starting");
    info!("Config directory: {}", config_dir.display());

    let listener = bind_gateway(&config).await?;

    let local_addr = listener.local_addr().map_err(|e| GatewayError::Gateway {
        message: format!("Failed to read bound address: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;
    info!("Gateway listening on {GATEWAY_WS_SCHEME}{local_addr}");

    ctrl_c().await.map_err(|e| GatewayError::Gateway {
        message: format!("Failed to wait for shutdown signal: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    info!("Shutdown signal received, releasing {local_addr}");
    drop(listener);

    Ok(())
}
