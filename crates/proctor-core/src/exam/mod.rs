//! Exam session domain module.
//!
//! This module contains the secure exam session engine together with the
//! components it drives and the boundaries it depends on.
//!
//! # Module Structure
//!
//! - `model`: Core entities (`Question`, `Candidate`, `Violation`, `Phase`, `Session`)
//! - `policy`: Session policy (`ExamPolicy`)
//! - `navigator`: Question sequencing and answer bookkeeping (`QuestionNavigator`)
//! - `monitor`: Host signal classification (`ViolationMonitor`, `HostSignal`)
//! - `engine`: The phase state machine (`SessionEngine`)
//! - `submission`: Finalize hand-off types (`SubmissionRequest`, `ResultPayload`)
//! - `backend`: Exam Backend Service trait (`ExamBackend`)
//! - `host`: Presentation and camera traits
//! - `snapshot`: Read-only UI views
//! - `placeholder`: Fallback question bank
//!
//! # Usage
//!
//! ```ignore
//! use proctor_core::exam::{SessionEngine, ExamPolicy, Candidate};
//! use proctor_core::exam::{HostSignal, ViolationKind};
//! ```

mod backend;
mod engine;
mod engine_test;
mod host;
mod model;
mod monitor;
mod navigator;
mod placeholder;
mod policy;
mod snapshot;
mod submission;

// Re-export public API
pub use backend::ExamBackend;
pub use engine::{EngineEffect, SessionEngine, TickOutcome, ViolationAlert, ViolationOutcome};
pub use host::{CameraFeed, PresentationControl};
pub use model::{
    Candidate, FinalizeReason, MAX_OPTIONS, MIN_OPTIONS, Phase, Question, QuestionPart,
    QuestionView, ResultStatus, Session, Violation, ViolationKind,
};
pub use monitor::{
    DEV_TOOLS_KEY, FORBIDDEN_CHORD_KEYS, HostSignal, KeyChord, SignalVerdict, ViolationMonitor,
};
pub use navigator::{QuestionMark, QuestionNavigator};
pub use placeholder::{PLACEHOLDER_QUESTION_COUNT, placeholder_questions};
pub use policy::ExamPolicy;
pub use snapshot::{ReviewSummary, SessionSnapshot};
pub use submission::{
    ResultPayload, SessionReport, SubmissionOutcome, SubmissionReceipt, SubmissionRequest,
};
