//! Submission pipeline use case.
//!
//! Runs once per session, after the engine has entered `Submitting`. Every
//! step is best-effort: the local finalize decision already stands and
//! nothing here can roll it back.

use chrono::Utc;
use proctor_core::exam::{
    ExamBackend, PresentationControl, ResultPayload, SubmissionOutcome, SubmissionReceipt,
    SubmissionRequest,
};
use std::sync::Arc;

const AUDIT: &str = "proctor::audit";

pub struct SubmissionPipeline {
    backend: Arc<dyn ExamBackend>,
    presentation: Arc<dyn PresentationControl>,
}

impl SubmissionPipeline {
    pub fn new(backend: Arc<dyn ExamBackend>, presentation: Arc<dyn PresentationControl>) -> Self {
        Self {
            backend,
            presentation,
        }
    }

    /// Exits secure mode, then pushes the result to the backend.
    ///
    /// Always returns a receipt; failures are folded into it.
    pub async fn run(&self, request: SubmissionRequest) -> SubmissionReceipt {
        let presentation_exited = match self.presentation.exit_secure_mode().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("[SubmissionPipeline] Could not exit secure mode: {}", e);
                false
            }
        };

        let payload = ResultPayload::compose(&request);
        let outcome = match self.backend.submit_result(&payload).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("[SubmissionPipeline] Result submission failed: {}", e);
                SubmissionOutcome::Failed(e.to_string())
            }
        };

        tracing::info!(
            target: AUDIT,
            exam_id = %payload.exam_id,
            roll_no = %payload.roll_no,
            status = %payload.status,
            violations = payload.violations,
            outcome = ?outcome,
            "[SubmissionPipeline] Submission complete"
        );

        SubmissionReceipt {
            outcome,
            presentation_exited,
            completed_at: Utc::now(),
        }
    }
}
