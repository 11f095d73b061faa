//! AWS-oriented adapters and handlers for the contact form relay.
//!
//! This crate owns runtime integration details (the Lambda handler, the mail
//! service port, configuration and logging) and re-exports the core crate's
//! contract, composition and error primitives under `runtime`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod logging;

pub mod runtime {
    pub use contact_relay_core::{compose, contract, error};
}
