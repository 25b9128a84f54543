//! Session bootstrap use case.
//!
//! Loads the question bank, falls back to the placeholder set when the
//! backend has nothing usable, composes the paper and hands back a started
//! [`SessionEngine`].

use proctor_core::config::ExamSettings;
use proctor_core::error::{ProctorError, Result};
use proctor_core::exam::{
    Candidate, ExamBackend, Question, QuestionPart, SessionEngine, ViolationMonitor,
    placeholder_questions,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Prepares sessions for one exam.
pub struct SessionBootstrap {
    backend: Arc<dyn ExamBackend>,
    settings: ExamSettings,
    monitor: ViolationMonitor,
}

impl SessionBootstrap {
    pub fn new(backend: Arc<dyn ExamBackend>, settings: ExamSettings) -> Self {
        Self {
            backend,
            settings,
            monitor: ViolationMonitor::new(),
        }
    }

    /// Monitor handed to every engine this bootstrap creates.
    pub fn with_monitor(mut self, monitor: ViolationMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn settings(&self) -> &ExamSettings {
        &self.settings
    }

    /// Fetches and cleans the bank, falling back to placeholders.
    ///
    /// Never fails: a backend error or an empty (or entirely malformed)
    /// bank yields the placeholder set.
    pub async fn load_bank(&self) -> Vec<Question> {
        let exam_id = &self.settings.exam_id;
        let fetched = match self.backend.fetch_questions(exam_id).await {
            Ok(questions) => sanitize_bank(questions),
            Err(e) => {
                tracing::warn!("[SessionBootstrap] Question fetch failed: {}", e);
                Vec::new()
            }
        };

        if fetched.is_empty() {
            tracing::warn!(
                "[SessionBootstrap] No usable questions for exam {}, using placeholder set",
                exam_id
            );
            placeholder_questions()
        } else {
            fetched
        }
    }

    /// Builds and starts an engine for `candidate`.
    ///
    /// # Errors
    ///
    /// A bank that cannot fill any of the configured sections is used whole.
    ///
    /// # Errors
    ///
    /// `Config` when no questions are available at all or the policy is
    /// invalid.
    pub async fn prepare(&self, candidate: Candidate) -> Result<SessionEngine> {
        let bank = self.load_bank().await;
        let mut paper = compose_paper(
            bank.clone(),
            self.settings.part_a_count,
            self.settings.part_b_count,
        );
        if paper.is_empty() {
            tracing::warn!(
                "[SessionBootstrap] No questions match the paper composition for {}, using the whole bank",
                self.settings.exam_id
            );
            paper = bank;
        }
        if paper.is_empty() {
            return Err(ProctorError::config(format!(
                "cannot load assessment '{}': no questions available",
                self.settings.exam_id
            )));
        }

        tracing::info!(
            "[SessionBootstrap] Prepared paper of {} questions for {}",
            paper.len(),
            candidate.roll_no
        );

        let mut engine = SessionEngine::new(self.settings.exam_id.clone(), candidate)
            .with_monitor(self.monitor.clone());
        engine.start(paper, self.settings.policy())?;
        Ok(engine)
    }
}

/// Drops malformed and duplicate records, keeping bank order.
pub fn sanitize_bank(questions: Vec<Question>) -> Vec<Question> {
    let mut seen = HashSet::new();
    questions
        .into_iter()
        .filter(|question| {
            if let Err(e) = question.validate() {
                tracing::warn!("[SessionBootstrap] Dropping question '{}': {}", question.id, e);
                return false;
            }
            if !seen.insert(question.id.clone()) {
                tracing::warn!("[SessionBootstrap] Dropping duplicate question '{}'", question.id);
                return false;
            }
            true
        })
        .collect()
}

/// First `part_a` Part A questions followed by the first `part_b` Part B
/// questions. Both zero means the whole bank.
pub fn compose_paper(bank: Vec<Question>, part_a: usize, part_b: usize) -> Vec<Question> {
    if part_a == 0 && part_b == 0 {
        return bank;
    }

    let (section_a, section_b): (Vec<_>, Vec<_>) =
        bank.into_iter().partition(|q| q.part == QuestionPart::A);

    if section_a.len() < part_a || section_b.len() < part_b {
        tracing::warn!(
            "[SessionBootstrap] Bank short of requested paper (A {}/{}, B {}/{})",
            section_a.len(),
            part_a,
            section_b.len(),
            part_b
        );
    }

    section_a
        .into_iter()
        .take(part_a)
        .chain(section_b.into_iter().take(part_b))
        .collect()
}
