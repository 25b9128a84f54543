//! Host presentation and proctoring-feed boundaries.

use crate::error::Result;
use async_trait::async_trait;

/// Control over secure (full-screen) presentation mode.
///
/// Failures are reported as `PresentationMode` errors and are always
/// recovered silently by callers.
#[async_trait]
pub trait PresentationControl: Send + Sync {
    async fn enter_secure_mode(&self) -> Result<()>;
    async fn exit_secure_mode(&self) -> Result<()>;
}

/// The proctoring camera feed, acquired once at session start.
///
/// A failure to acquire puts the session in degraded mode; it is never a
/// violation.
pub trait CameraFeed: Send + Sync {
    fn acquire(&self) -> Result<()>;
}
