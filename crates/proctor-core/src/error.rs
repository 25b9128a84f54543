//! Error types for the Proctor engine.

use crate::exam::Phase;
use thiserror::Error;

/// A shared error type for the entire Proctor workspace.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
///
/// Integrity violations are deliberately absent: they are recorded events,
/// never errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProctorError {
    /// The session cannot start (no usable questions, invalid policy)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external Exam Backend Service could not be reached or rejected a call
    #[error("Backend unavailable during {operation}: {message}")]
    BackendUnavailable {
        operation: &'static str,
        message: String,
    },

    /// The host refused to enter or leave secure presentation mode
    #[error("Presentation mode error: {0}")]
    PresentationMode(String),

    /// The requested action is not allowed in the current phase
    #[error("Cannot {action} while session is {phase}")]
    InvalidTransition { phase: Phase, action: &'static str },

    /// Navigation target outside the question sequence
    #[error("Question index {index} out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },

    /// Option index outside the question's option list
    #[error("Option {option_index} is not valid for question '{question_id}' ({option_count} options)")]
    InvalidAnswer {
        question_id: String,
        option_index: usize,
        option_count: usize,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A policy-gated feature was requested while disabled
    #[error("Feature disabled by exam policy: {0}")]
    FeatureDisabled(&'static str),

    /// Calculator expression could not be evaluated
    #[error("Calculator error: {0}")]
    Calculator(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProctorError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a BackendUnavailable error
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            operation,
            message: message.into(),
        }
    }

    /// Creates a PresentationMode error
    pub fn presentation(message: impl Into<String>) -> Self {
        Self::PresentationMode(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a backend availability error
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }

    /// Check if this is a phase transition error
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error must block the candidate.
    ///
    /// Only a session that cannot start is blocking; every other failure
    /// degrades gracefully.
    pub fn is_blocking(&self) -> bool {
        self.is_config()
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ProctorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ProctorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ProctorError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ProctorError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ProctorError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, ProctorError>`.
pub type Result<T> = std::result::Result<T, ProctorError>;
