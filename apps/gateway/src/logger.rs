//! Gateway log output.
//!
//! One `fern` dispatch feeds two sinks: coloured lines on stdout and plain
//! lines appended to `gateway.log`. Levels come from the `logging` section of
//! `config.json`, so the retry loop (`gateway_core::listen`) or the replay
//! sanitizer (`gateway_core::replay`) can be turned up on their own.

use crate::error::GatewayError;

use gateway_core::config::LoggingSettings;

use common::ErrorLocation;

use std::fmt::{Arguments, Display};
use std::io::stdout;
use std::panic::Location;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339_millis;
use log::{LevelFilter, Record, debug, warn};

pub const LOG_FILE_NAME: &str = "gateway.log";

#[cfg(debug_assertions)]
const BUILD_DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const BUILD_DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Set once a global logger has been installed by this module.
static INSTALLED: AtomicBool = AtomicBool::new(false);

/// Effective levels: a default plus per-target overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLevels {
    pub default: LevelFilter,
    pub targets: Vec<(String, LevelFilter)>,
}

impl LogLevels {
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            default: settings.level.unwrap_or(BUILD_DEFAULT_LEVEL),
            targets: settings
                .modules
                .iter()
                .map(|(target, level)| (target.clone(), *level))
                .collect(),
        }
    }

    /// Most verbose level any target is allowed.
    pub fn most_verbose(&self) -> LevelFilter {
        self.targets
            .iter()
            .map(|(_, level)| *level)
            .fold(self.default, Ord::max)
    }
}

/// Install the gateway logger.
///
/// Only the first successful call installs anything; later calls log a
/// warning and keep the first configuration.
///
/// # Errors
///
/// Returns [`GatewayError::Gateway`] if the log file cannot be opened or
/// another global logger is already set.
pub fn initialize(log_dir: &Path, settings: &LoggingSettings) -> Result<(), GatewayError> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized, keeping the first configuration");
        return Ok(());
    }

    let levels = LogLevels::from_settings(settings);
    let installed = build_dispatch(log_dir, &levels).and_then(|dispatch| {
        dispatch.apply().map_err(|e| GatewayError::Gateway {
            message: format!("Failed to install logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    });

    if installed.is_err() {
        INSTALLED.store(false, Ordering::SeqCst);
        return installed;
    }

    debug!(
        "Logging at {} ({} target overrides) to {}",
        levels.default,
        levels.targets.len(),
        log_dir.join(LOG_FILE_NAME).display()
    );
    Ok(())
}

/// Build the stdout + file dispatch for `levels` without installing it.
///
/// Opens (appending) `gateway.log` in `log_dir`.
///
/// # Errors
///
/// Returns [`GatewayError::Gateway`] if the log file cannot be opened.
#[track_caller]
pub fn build_dispatch(log_dir: &Path, levels: &LogLevels) -> Result<Dispatch, GatewayError> {
    let log_path = log_dir.join(LOG_FILE_NAME);
    let log_file = fern::log_file(&log_path).map_err(|e| GatewayError::Gateway {
        message: format!("Failed to create log file {}: {e}", log_path.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::BrightBlack);

    let terminal = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, message, record, colors.color(record.level()))
        })
        .chain(stdout());

    let file = Dispatch::new()
        .format(|out, message, record| write_line(out, message, record, record.level()))
        .chain(log_file);

    let filtered = levels
        .targets
        .iter()
        .fold(Dispatch::new().level(levels.default), |dispatch, (target, level)| {
            dispatch.level_for(target.clone(), *level)
        });

    Ok(filtered.chain(terminal).chain(file))
}

fn write_line(out: FormatCallback<'_>, message: &Arguments<'_>, record: &Record<'_>, level: impl Display) {
    out.finish(format_args!(
        "{time} {level} {target}: {message}",
        time = format_rfc3339_millis(SystemTime::now()),
        target = record.target(),
    ))
}
