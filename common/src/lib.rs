//! Shared primitives for the gateway workspace.
//!
//! Everything here is dependency-light and used by every other crate:
//!
//! - **common** (this crate): error location tracking
//! - **models**: pure data (bind targets, conversation messages)
//! - **gateway-core**: listen/retry, replay sanitizing, config
//! - **gateway**: the binary wiring it all together

pub mod error;

pub use error::error_location::ErrorLocation;
