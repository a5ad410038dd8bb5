use common::ErrorLocation;
use gateway_core::error::CoreError;
use gateway_core::error::listen::ListenError;

use std::panic::Location;

use thiserror::Error;

/// Errors that stop the gateway from starting.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Error from this binary (logging, directories, signals)
    #[error("Gateway Error: {message} {location}")]
    Gateway {
        message: String,
        location: ErrorLocation,
    },

    /// Error from gateway-core (config, bind target, bind)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
        #[source]
        source: CoreError,
    },

    /// Another instance kept the endpoint for the whole retry budget
    #[error("Lock Error: {message} {location}")]
    Lock {
        message: String,
        endpoint: String,
        location: ErrorLocation,
        #[source]
        source: ListenError,
    },
}

impl GatewayError {
    /// Wrap a gateway-core failure raised at the caller's location.
    #[track_caller]
    pub fn core(source: impl Into<CoreError>) -> Self {
        let source = source.into();
        GatewayError::Core {
            message: source.to_string(),
            location: ErrorLocation::from(Location::caller()),
            source,
        }
    }

    /// Lock conflicts become [`GatewayError::Lock`]; other bind failures are
    /// core errors.
    #[track_caller]
    pub fn from_listen(err: ListenError) -> Self {
        if !err.is_lock_conflict() {
            return Self::core(err);
        }

        GatewayError::Lock {
            message: err.message().to_string(),
            endpoint: err.endpoint().to_string(),
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }

    pub fn is_lock(&self) -> bool {
        matches!(self, GatewayError::Lock { .. })
    }
}
