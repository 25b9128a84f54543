//! Runtime for a live exam session.
//!
//! [`SessionRuntime`] owns the [`SessionEngine`](proctor_core::exam::SessionEngine)
//! inside a single task and serializes every input (host signals, timer
//! ticks, candidate actions, the submission receipt) through one command
//! channel.

pub mod audit_layer;
pub mod command;
pub mod runtime;
pub mod timer;

pub use audit_layer::{AUDIT_TARGET, AuditLayer, AuditRecord};
pub use command::{RuntimeEvent, SessionCommand};
pub use runtime::{RuntimeDeps, SessionHandle, SessionRuntime};
pub use timer::CountdownTimer;
