//! Exam domain model.
//!
//! This module contains the entities and value objects the session engine
//! operates on: candidates, questions, violations and the session phase.

use super::navigator::QuestionNavigator;
use crate::error::{ProctorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uuid::Uuid;

/// Minimum number of options a question may carry.
pub const MIN_OPTIONS: usize = 2;
/// Maximum number of options a question may carry.
pub const MAX_OPTIONS: usize = 4;

/// Identity record of the candidate sitting the exam.
///
/// Established by the login collaborator before the session exists and
/// immutable for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Roll / registration number
    pub roll_no: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub section: String,
}

impl Candidate {
    pub fn new(roll_no: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            roll_no: roll_no.into(),
            name: name.into(),
            department: String::new(),
            year: String::new(),
            section: String::new(),
        }
    }
}

/// Weight class of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum QuestionPart {
    #[serde(rename = "PART_A")]
    #[strum(to_string = "Section A")]
    A,
    #[serde(rename = "PART_B")]
    #[strum(to_string = "Section B")]
    B,
}

impl QuestionPart {
    /// Marks awarded for a correct answer in this part.
    pub fn marks(self) -> u32 {
        match self {
            QuestionPart::A => 1,
            QuestionPart::B => 2,
        }
    }
}

/// A single multiple-choice question, including its answer key.
///
/// The answer key never leaves the engine towards the candidate; use
/// [`Question::view`] for anything rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the session
    pub id: String,
    /// Question text, may embed `$...$` / `$$...$$` math markup
    pub text: String,
    /// Ordered answer options (2 to 4 entries)
    pub options: Vec<String>,
    /// Index of the correct option
    pub correct_answer_index: usize,
    /// Optional reference to an illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub part: QuestionPart,
}

impl Question {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Checks the structural constraints of a question record.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ProctorError::config("question id must not be blank"));
        }
        if self.text.trim().is_empty() {
            return Err(ProctorError::config(format!(
                "question '{}' has no text",
                self.id
            )));
        }
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&self.options.len()) {
            return Err(ProctorError::config(format!(
                "question '{}' has {} options, expected {}-{}",
                self.id,
                self.options.len(),
                MIN_OPTIONS,
                MAX_OPTIONS
            )));
        }
        if self.correct_answer_index >= self.options.len() {
            return Err(ProctorError::config(format!(
                "question '{}' answer key {} is out of range",
                self.id, self.correct_answer_index
            )));
        }
        Ok(())
    }

    /// Candidate-facing projection without the answer key.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            id: self.id.clone(),
            text: self.text.clone(),
            options: self.options.clone(),
            image_ref: self.image_ref.clone(),
            part: self.part,
            marks: self.part.marks(),
        }
    }
}

/// What the candidate is allowed to see of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub image_ref: Option<String>,
    pub part: QuestionPart,
    pub marks: u32,
}

/// Closed set of integrity violation kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ViolationKind {
    ForbiddenKey,
    ClipboardAttempt,
    ContextMenu,
    TabHidden,
    WindowBlur,
    FullscreenExit,
}

impl ViolationKind {
    /// Alert headline shown to the candidate.
    pub fn describe(self) -> &'static str {
        match self {
            ViolationKind::ForbiddenKey => "Unauthorized Keyboard Input",
            ViolationKind::ClipboardAttempt => "Clipboard Access Attempt",
            ViolationKind::ContextMenu => "Context Menu Attempt",
            ViolationKind::TabHidden => "Tab/Window Switched",
            ViolationKind::WindowBlur => "Application Focus Lost",
            ViolationKind::FullscreenExit => "Full-screen Breach",
        }
    }
}

/// An immutable record of one detected integrity breach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub timestamp: DateTime<Utc>,
}

impl Violation {
    pub fn now(kind: ViolationKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Lifecycle phase of a session.
///
/// `Loading → InProgress ⇄ Reviewing → Submitting → Finalized`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Phase {
    Loading,
    InProgress,
    Reviewing,
    Submitting,
    Finalized,
}

impl Phase {
    /// Whether violation and timer events are honored in this phase.
    pub fn is_live(self) -> bool {
        matches!(self, Phase::InProgress | Phase::Reviewing)
    }

    /// Whether finalize has already begun.
    pub fn is_closing(self) -> bool {
        matches!(self, Phase::Submitting | Phase::Finalized)
    }
}

/// What triggered finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinalizeReason {
    CandidateSubmit,
    TimeExpired,
    ThresholdExceeded,
}

impl FinalizeReason {
    pub fn result_status(self) -> ResultStatus {
        match self {
            FinalizeReason::CandidateSubmit => ResultStatus::Submitted,
            FinalizeReason::TimeExpired | FinalizeReason::ThresholdExceeded => {
                ResultStatus::Terminated
            }
        }
    }
}

/// Status recorded with the result on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Submitted,
    Terminated,
}

/// One candidate's single attempt at one exam instance.
///
/// Owned exclusively by [`super::SessionEngine`]; everything outside the
/// engine reads it through accessors.
#[derive(Debug, Clone)]
pub struct Session {
    pub(super) id: String,
    pub(super) attempt_id: Uuid,
    pub(super) candidate: Candidate,
    pub(super) navigator: QuestionNavigator,
    pub(super) violations: Vec<Violation>,
    pub(super) time_remaining_seconds: u32,
    pub(super) phase: Phase,
    pub(super) camera_degraded: bool,
}

impl Session {
    pub(super) fn new(id: String, candidate: Candidate) -> Self {
        Self {
            id,
            attempt_id: Uuid::new_v4(),
            candidate,
            navigator: QuestionNavigator::default(),
            violations: Vec::new(),
            time_remaining_seconds: 0,
            phase: Phase::Loading,
            camera_degraded: false,
        }
    }

    /// Exam identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier of this particular attempt
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn candidate(&self) -> &Candidate {
        &self.candidate
    }

    pub fn navigator(&self) -> &QuestionNavigator {
        &self.navigator
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn time_remaining_seconds(&self) -> u32 {
        self.time_remaining_seconds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the proctoring camera could not be acquired
    pub fn camera_degraded(&self) -> bool {
        self.camera_degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn question(options: usize, key: usize) -> Question {
        Question {
            id: "q-1".to_string(),
            text: "Pick one".to_string(),
            options: (0..options).map(|i| format!("opt {i}")).collect(),
            correct_answer_index: key,
            image_ref: None,
            part: QuestionPart::A,
        }
    }

    #[test]
    fn test_question_option_bounds() {
        assert!(question(1, 0).validate().is_err());
        assert!(question(2, 1).validate().is_ok());
        assert!(question(4, 3).validate().is_ok());
        assert!(question(5, 0).validate().is_err());
        assert!(question(3, 3).validate().is_err());
    }

    #[test]
    fn test_view_hides_answer_key() {
        let view = question(4, 2).view();
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("correct_answer_index").is_none());
        assert_eq!(view.marks, 1);
    }

    #[test]
    fn test_violation_kind_wire_names() {
        let names: Vec<String> = ViolationKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "forbidden-key",
                "clipboard-attempt",
                "context-menu",
                "tab-hidden",
                "window-blur",
                "fullscreen-exit"
            ]
        );
        let json = serde_json::to_string(&ViolationKind::WindowBlur).unwrap();
        assert_eq!(json, "\"window-blur\"");
    }

    #[test]
    fn test_reason_maps_to_status() {
        assert_eq!(
            FinalizeReason::CandidateSubmit.result_status(),
            ResultStatus::Submitted
        );
        assert_eq!(
            FinalizeReason::ThresholdExceeded.result_status(),
            ResultStatus::Terminated
        );
        assert_eq!(ResultStatus::Terminated.to_string(), "TERMINATED");
    }

    #[test]
    fn test_part_wire_names_and_marks() {
        let json = serde_json::to_string(&QuestionPart::B).unwrap();
        assert_eq!(json, "\"PART_B\"");
        assert_eq!(QuestionPart::B.marks(), 2);
    }
}
