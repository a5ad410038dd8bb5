//! Listening socket acquisition for the gateway.
//!
//! A supervised restart can start the new gateway while the previous process
//! is still releasing its socket. This module binds the gateway endpoint and
//! rides out that window:
//!
//! - [`listen_with_retry`] retries "address in use" with exponential backoff
//! - [`SocketBinder`] abstracts the listener so the loop can be driven by tests
//! - [`holder::find_port_holder`] names the process still holding the port once
//!   the budget is exhausted
//!
//! # Outcomes
//!
//! Success after any number of retries looks the same to the caller. Failures are
//! split into [`ListenError::LockConflict`] (another live instance owns the
//! endpoint) and [`ListenError::Bind`] (anything else).
//!
//! [`ListenError::LockConflict`]: crate::error::listen::ListenError::LockConflict
//! [`ListenError::Bind`]: crate::error::listen::ListenError::Bind

mod binder;
pub mod holder;
mod retry;

pub use binder::{SocketBinder, TcpBinder};
pub use retry::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy, gateway_endpoint, is_addr_in_use,
    listen_with_retry,
};
