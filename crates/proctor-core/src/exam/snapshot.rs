//! Read-only views of a session for the presentation layer.

use super::model::{Phase, QuestionView, Violation};
use super::navigator::QuestionMark;
use serde::{Deserialize, Serialize};

/// Pre-submit summary shown in the review phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub answered: usize,
    pub flagged: usize,
    pub violations: usize,
    pub total_questions: usize,
    pub total_marks: u32,
}

/// Everything a UI needs to render the current state.
///
/// Contains question views only, never answer keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub exam_id: String,
    pub candidate_name: String,
    pub candidate_roll_no: String,
    pub phase: Phase,
    pub time_remaining_seconds: u32,
    pub current_index: usize,
    pub total_questions: usize,
    pub current_question: Option<QuestionView>,
    pub current_answer: Option<usize>,
    pub current_flagged: bool,
    pub grid: Vec<QuestionMark>,
    pub violations: Vec<Violation>,
    pub max_violations: u32,
    pub camera_degraded: bool,
    pub calculator_enabled: bool,
    pub review_enabled: bool,
    pub summary: ReviewSummary,
}

impl SessionSnapshot {
    /// One violation away from termination.
    pub fn on_last_strike(&self) -> bool {
        self.violations.len() + 1 >= self.max_violations as usize
    }
}
