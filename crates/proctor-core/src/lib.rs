//! Domain layer for PROCTOR.
//!
//! Holds the secure exam session engine and everything it reasons about.
//! This crate performs no I/O; collaborators (backend, presentation, camera)
//! are reached through the traits in [`exam`].

pub mod calculator;
pub mod config;
pub mod error;
pub mod exam;
pub mod markup;

// Re-export common error type
pub use error::ProctorError;
