//! Finalize hand-off types.
//!
//! The engine produces a [`SubmissionRequest`] exactly once per session. The
//! submission pipeline turns it into a [`ResultPayload`] for the backend and
//! reports back with a [`SubmissionReceipt`].

use super::model::{Candidate, FinalizeReason, ResultStatus, Violation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Snapshot of the session taken at the moment finalize begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRequest {
    pub exam_id: String,
    pub attempt_id: Uuid,
    pub candidate: Candidate,
    pub answers: BTreeMap<String, usize>,
    pub violations: Vec<Violation>,
    pub reason: FinalizeReason,
    pub requested_at: DateTime<Utc>,
}

impl SubmissionRequest {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

/// Result record pushed to the Exam Backend Service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPayload {
    pub roll_no: String,
    pub exam_id: String,
    pub violations: usize,
    pub answers: BTreeMap<String, usize>,
    pub status: ResultStatus,
    pub reason: FinalizeReason,
    pub violation_log: Vec<Violation>,
    pub submitted_at: DateTime<Utc>,
}

impl ResultPayload {
    pub fn compose(request: &SubmissionRequest) -> Self {
        Self {
            roll_no: request.candidate.roll_no.clone(),
            exam_id: request.exam_id.clone(),
            violations: request.violation_count(),
            answers: request.answers.clone(),
            status: request.reason.result_status(),
            reason: request.reason,
            violation_log: request.violations.clone(),
            submitted_at: request.requested_at,
        }
    }
}

/// How the best-effort remote copy went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Backend acknowledged the result
    Acknowledged,
    /// No backend configured (offline mode)
    Skipped,
    /// Backend could not be reached; local termination still stands
    Failed(String),
}

impl SubmissionOutcome {
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, SubmissionOutcome::Acknowledged)
    }
}

/// What the submission pipeline reports back to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub outcome: SubmissionOutcome,
    /// Whether secure presentation mode was left cleanly
    pub presentation_exited: bool,
    pub completed_at: DateTime<Utc>,
}

/// Final hand-off to the surrounding application once a session is over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub exam_id: String,
    pub attempt_id: Uuid,
    pub candidate: Candidate,
    pub reason: FinalizeReason,
    pub answers: BTreeMap<String, usize>,
    pub violations: Vec<Violation>,
    pub receipt: SubmissionReceipt,
    pub finalized_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exam::model::ViolationKind;

    #[test]
    fn test_payload_composition() {
        let mut answers = BTreeMap::new();
        answers.insert("q-1".to_string(), 2);
        let request = SubmissionRequest {
            exam_id: "SEM-APR-2024".to_string(),
            attempt_id: Uuid::new_v4(),
            candidate: Candidate::new("21CS001", "Asha"),
            answers,
            violations: vec![Violation::now(ViolationKind::WindowBlur)],
            reason: FinalizeReason::ThresholdExceeded,
            requested_at: Utc::now(),
        };

        let payload = ResultPayload::compose(&request);
        assert_eq!(payload.roll_no, "21CS001");
        assert_eq!(payload.violations, 1);
        assert_eq!(payload.status, ResultStatus::Terminated);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["rollNo"], "21CS001");
        assert_eq!(json["examId"], "SEM-APR-2024");
        assert_eq!(json["answers"]["q-1"], 2);
        assert_eq!(json["status"], "TERMINATED");
        assert_eq!(json["violationLog"][0]["kind"], "window-blur");
    }
}
