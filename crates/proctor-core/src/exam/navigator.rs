//! Question sequencing and answer bookkeeping.
//!
//! The navigator is presentational bookkeeping only. It never decides
//! anything about the session lifecycle; the engine gates calls by phase.

use super::model::{Question, QuestionView};
use crate::error::{ProctorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Status of one cell in the question grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionMark {
    Current,
    Flagged,
    Answered,
    Unanswered,
}

/// Ordered question set with the candidate's position, answers and flags.
#[derive(Debug, Clone, Default)]
pub struct QuestionNavigator {
    questions: Vec<Question>,
    current: usize,
    answers: BTreeMap<String, usize>,
    flagged: BTreeSet<String>,
}

impl QuestionNavigator {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn current_view(&self) -> Option<QuestionView> {
        self.current().map(Question::view)
    }

    pub fn is_at_last(&self) -> bool {
        !self.questions.is_empty() && self.current + 1 == self.questions.len()
    }

    /// Moves to `index`.
    ///
    /// Out-of-range targets are rejected and leave the position unchanged;
    /// they are never clamped.
    pub fn go_to(&mut self, index: usize) -> Result<()> {
        if index >= self.questions.len() {
            return Err(ProctorError::OutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.current = index;
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        self.go_to(self.current + 1)
    }

    pub fn previous(&mut self) -> Result<()> {
        match self.current.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => Err(ProctorError::OutOfRange {
                index: 0,
                len: self.questions.len(),
            }),
        }
    }

    fn find(&self, question_id: &str) -> Result<&Question> {
        self.questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| ProctorError::not_found("Question", question_id))
    }

    /// Records (or replaces) the answer for a question.
    ///
    /// Returns the previously selected option, if any.
    pub fn set_answer(&mut self, question_id: &str, option_index: usize) -> Result<Option<usize>> {
        let question = self.find(question_id)?;
        if option_index >= question.option_count() {
            return Err(ProctorError::InvalidAnswer {
                question_id: question_id.to_string(),
                option_index,
                option_count: question.option_count(),
            });
        }
        Ok(self.answers.insert(question_id.to_string(), option_index))
    }

    pub fn answer_for(&self, question_id: &str) -> Option<usize> {
        self.answers.get(question_id).copied()
    }

    /// Flips the review flag. Returns whether the question is now flagged.
    pub fn toggle_flag(&mut self, question_id: &str) -> Result<bool> {
        self.find(question_id)?;
        if self.flagged.remove(question_id) {
            Ok(false)
        } else {
            self.flagged.insert(question_id.to_string());
            Ok(true)
        }
    }

    pub fn is_flagged(&self, question_id: &str) -> bool {
        self.flagged.contains(question_id)
    }

    pub fn answers(&self) -> &BTreeMap<String, usize> {
        &self.answers
    }

    pub fn flagged(&self) -> &BTreeSet<String> {
        &self.flagged
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }

    /// Marks available across the whole paper.
    pub fn total_marks(&self) -> u32 {
        self.questions.iter().map(|q| q.part.marks()).sum()
    }

    /// Per-question grid status; current beats flagged beats answered.
    pub fn grid(&self) -> Vec<QuestionMark> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                if index == self.current {
                    QuestionMark::Current
                } else if self.flagged.contains(&q.id) {
                    QuestionMark::Flagged
                } else if self.answers.contains_key(&q.id) {
                    QuestionMark::Answered
                } else {
                    QuestionMark::Unanswered
                }
            })
            .collect()
    }
}
