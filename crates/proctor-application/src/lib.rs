//! Application layer for PROCTOR.
//!
//! Use cases wiring the domain engine to its collaborators:
//! [`SessionBootstrap`] prepares a started engine, [`SubmissionPipeline`]
//! carries out the one-shot finalize side effects.

pub mod bootstrap;
pub mod submission;

pub use bootstrap::{SessionBootstrap, compose_paper, sanitize_bank};
pub use submission::SubmissionPipeline;
