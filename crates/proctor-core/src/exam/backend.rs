//! Exam Backend Service boundary.

use super::model::Question;
use super::submission::{ResultPayload, SubmissionOutcome};
use crate::error::Result;
use async_trait::async_trait;

/// The external store that serves question sets and receives results.
///
/// Both calls may fail; callers are expected to degrade gracefully
/// (fallback questions on fetch, best-effort on submit).
#[async_trait]
pub trait ExamBackend: Send + Sync {
    /// Fetches the question bank for an exam.
    ///
    /// # Returns
    ///
    /// - `Ok(questions)`: Bank retrieved (may be empty)
    /// - `Err(_)`: Backend unavailable or returned malformed data
    async fn fetch_questions(&self, exam_id: &str) -> Result<Vec<Question>>;

    /// Pushes a finalized result.
    ///
    /// # Returns
    ///
    /// - `Ok(SubmissionOutcome::Acknowledged)`: Result stored remotely
    /// - `Ok(SubmissionOutcome::Skipped)`: No remote store configured
    /// - `Err(_)`: Backend unavailable
    async fn submit_result(&self, payload: &ResultPayload) -> Result<SubmissionOutcome>;
}
