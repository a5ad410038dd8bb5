//! Domain models for the gateway.
//!
//! This crate contains pure data structures shared by the listen and replay
//! layers. Models carry validation but no I/O - they're just data that can be
//! passed between layers.
//!
//! ## Architecture
//!
//! - **models** (this crate): Pure data structures
//! - **gateway-core**: Business logic operating on models
//! - **gateway**: Application wiring everything together

pub mod bind_target;
pub mod conversation;
pub mod error;
pub mod port_holder;

pub use bind_target::{BindTarget, BindTargetBuilder};
pub use common::ErrorLocation;
pub use conversation::{ContentBlock, Message, MessageContent, Role, ThinkingBlock};
pub use error::model_error::ModelError;
pub use port_holder::PortHolder;

#[cfg(test)]
mod tests;
