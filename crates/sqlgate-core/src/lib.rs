//! # sqlgate-core
//!
//! Shared building blocks for the challenge verification engine:
//! errors, configuration, tracing setup, the operation classifier
//! and the identifier sanitizer.

pub mod config;
pub mod errors;
pub mod identifier;
pub mod operation;
pub mod tracing;

pub use operation::{classify, Operation, RejectionReason};
