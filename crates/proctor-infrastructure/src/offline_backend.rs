use async_trait::async_trait;
use proctor_core::error::Result;
use proctor_core::exam::{ExamBackend, Question, ResultPayload, SubmissionOutcome};

/// Backend used when no service URL is configured.
///
/// Serves an empty bank, so the placeholder set is used, and records
/// nothing remotely.
#[derive(Debug, Default, Clone)]
pub struct OfflineExamBackend;

impl OfflineExamBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExamBackend for OfflineExamBackend {
    async fn fetch_questions(&self, exam_id: &str) -> Result<Vec<Question>> {
        tracing::debug!("[OfflineExamBackend] No remote bank for exam {}", exam_id);
        Ok(Vec::new())
    }

    async fn submit_result(&self, payload: &ResultPayload) -> Result<SubmissionOutcome> {
        tracing::info!(
            "[OfflineExamBackend] Result for {} kept locally ({})",
            payload.roll_no,
            payload.status
        );
        Ok(SubmissionOutcome::Skipped)
    }
}
