//! Contact form relay domain primitives.
//!
//! This crate owns event normalization, submission validation, and message
//! composition. It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod compose;
pub mod contract;
pub mod error;
