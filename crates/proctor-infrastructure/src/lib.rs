//! Infrastructure layer for PROCTOR.
//!
//! Concrete implementations of the collaborator boundaries defined in
//! `proctor-core`: the HTTP exam backend, the offline (mock) backend, and
//! file-based settings storage.

pub mod dto;
pub mod http_backend;
pub mod offline_backend;
pub mod paths;
pub mod settings_store;

pub use http_backend::HttpExamBackend;
pub use offline_backend::OfflineExamBackend;
pub use paths::ProctorPaths;
pub use settings_store::TomlSettingsStore;

use proctor_core::config::BackendConfig;
use proctor_core::exam::ExamBackend;
use std::sync::Arc;

/// Picks the backend implementation for a configuration.
///
/// An empty URL selects offline mode.
pub fn backend_from_config(config: &BackendConfig) -> Arc<dyn ExamBackend> {
    if config.is_offline() {
        tracing::info!("[Backend] No backend URL configured, running in offline mode");
        Arc::new(OfflineExamBackend::new())
    } else {
        Arc::new(HttpExamBackend::new(config.url.clone(), config.timeout()))
    }
}
