//! Session engine.
//!
//! The single authority over the session phase and the decision to finalize.
//! All entry points are synchronous and take `&mut self`; the runtime feeds
//! them one event at a time, so no locking is involved. Side effects the
//! engine cannot perform itself (timer control, alerts, submission) are
//! queued as [`EngineEffect`]s and drained by the caller after every call.

use super::model::{
    Candidate, FinalizeReason, Phase, Question, Session, Violation, ViolationKind,
};
use super::monitor::{HostSignal, SignalVerdict, ViolationMonitor};
use super::navigator::QuestionNavigator;
use super::policy::ExamPolicy;
use super::snapshot::{ReviewSummary, SessionSnapshot};
use super::submission::{SessionReport, SubmissionReceipt, SubmissionRequest};
use crate::calculator;
use crate::error::{ProctorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const AUDIT: &str = "proctor::audit";

/// A violation surfaced to the alert collaborator for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationAlert {
    pub kind: ViolationKind,
    pub message: String,
    /// Violations recorded so far, this one included
    pub count: usize,
    pub max_violations: u32,
    /// This violation crossed the escalation threshold
    pub escalated: bool,
    pub timestamp: DateTime<Utc>,
}

/// Work the engine asks its host to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEffect {
    StartTimer,
    StopTimer,
    Alert(ViolationAlert),
    PhaseChanged { from: Phase, to: Phase },
    /// Run the submission pipeline. Emitted exactly once per session.
    Submit(SubmissionRequest),
}

/// Result of [`SessionEngine::record_violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationOutcome {
    /// Session not live; the signal was discarded
    Ignored,
    Recorded { count: usize },
    /// The escalation threshold was crossed and finalize has begun
    ThresholdReached { count: usize },
}

/// Result of [`SessionEngine::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Running { remaining: u32 },
    Expired,
}

/// State machine for one exam attempt.
pub struct SessionEngine {
    session: Session,
    policy: ExamPolicy,
    monitor: ViolationMonitor,
    finalize_reason: Option<FinalizeReason>,
    receipt: Option<SubmissionReceipt>,
    finalized_at: Option<DateTime<Utc>>,
    effects: Vec<EngineEffect>,
}

impl SessionEngine {
    /// Creates an engine in the `Loading` phase.
    pub fn new(exam_id: impl Into<String>, candidate: Candidate) -> Self {
        Self {
            session: Session::new(exam_id.into(), candidate),
            policy: ExamPolicy::default(),
            monitor: ViolationMonitor::new(),
            finalize_reason: None,
            receipt: None,
            finalized_at: None,
            effects: Vec::new(),
        }
    }

    /// Replaces the violation monitor (e.g. with escalated suppression).
    pub fn with_monitor(mut self, monitor: ViolationMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn policy(&self) -> &ExamPolicy {
        &self.policy
    }

    pub fn finalize_reason(&self) -> Option<FinalizeReason> {
        self.finalize_reason
    }

    pub fn monitor(&self) -> &ViolationMonitor {
        &self.monitor
    }

    /// Takes the effects queued since the last drain, in order.
    pub fn drain_effects(&mut self) -> Vec<EngineEffect> {
        std::mem::take(&mut self.effects)
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Loads the question set and policy and opens the session.
    ///
    /// # Errors
    ///
    /// - `Config` if `questions` is empty, contains malformed or duplicate
    ///   records, or the policy is invalid
    /// - `InvalidTransition` if the session was already started
    pub fn start(&mut self, questions: Vec<Question>, policy: ExamPolicy) -> Result<()> {
        self.ensure_phase("start", &[Phase::Loading])?;

        if questions.is_empty() {
            return Err(ProctorError::config("no questions available for this exam"));
        }
        let mut seen = HashSet::new();
        for question in &questions {
            question.validate()?;
            if !seen.insert(question.id.as_str()) {
                return Err(ProctorError::config(format!(
                    "duplicate question id '{}'",
                    question.id
                )));
            }
        }
        policy.validate()?;

        let count = questions.len();
        self.session.navigator = QuestionNavigator::new(questions);
        self.session.time_remaining_seconds = policy.total_seconds();
        self.policy = policy;
        self.monitor.attach();
        self.transition(Phase::InProgress);
        self.effects.push(EngineEffect::StartTimer);

        tracing::info!(
            target: AUDIT,
            exam_id = %self.session.id,
            roll_no = %self.session.candidate.roll_no,
            questions = count,
            seconds = self.session.time_remaining_seconds,
            max_violations = self.policy.max_violations,
            "[SessionEngine] Session started"
        );
        Ok(())
    }

    /// Marks the proctoring feed as unavailable. Not a violation.
    pub fn mark_camera_degraded(&mut self) {
        if !self.session.camera_degraded {
            tracing::warn!(
                target: AUDIT,
                exam_id = %self.session.id,
                "[SessionEngine] Camera unavailable, continuing in degraded mode"
            );
        }
        self.session.camera_degraded = true;
    }

    /// Feeds a raw host signal through the monitor.
    ///
    /// Returns the monitor's verdict so the host knows whether to cancel
    /// the underlying action.
    pub fn observe_signal(&mut self, signal: &HostSignal) -> SignalVerdict {
        let verdict = self.monitor.observe(signal);
        if let Some(kind) = verdict.violation {
            self.record_violation(kind);
        }
        verdict
    }

    /// Appends a violation and escalates when the threshold is crossed.
    ///
    /// Only effective while `InProgress` or `Reviewing`; otherwise the
    /// violation is discarded.
    pub fn record_violation(&mut self, kind: ViolationKind) -> ViolationOutcome {
        if !self.session.phase.is_live() {
            tracing::debug!(
                "[SessionEngine] Discarding {} violation in phase {}",
                kind,
                self.session.phase
            );
            return ViolationOutcome::Ignored;
        }

        let violation = Violation::now(kind);
        let timestamp = violation.timestamp;
        self.session.violations.push(violation);
        let count = self.session.violations.len();
        let escalated = count >= self.policy.max_violations as usize;

        tracing::warn!(
            target: AUDIT,
            exam_id = %self.session.id,
            kind = %kind,
            count,
            max_violations = self.policy.max_violations,
            "[SessionEngine] Violation recorded"
        );

        self.effects.push(EngineEffect::Alert(ViolationAlert {
            kind,
            message: kind.describe().to_string(),
            count,
            max_violations: self.policy.max_violations,
            escalated,
            timestamp,
        }));

        if escalated {
            self.begin_finalize(FinalizeReason::ThresholdExceeded);
            ViolationOutcome::ThresholdReached { count }
        } else {
            ViolationOutcome::Recorded { count }
        }
    }

    /// Advances the countdown by one second.
    ///
    /// A tick outside `InProgress`/`Reviewing` is a no-op, which makes a
    /// stale tick racing with finalize harmless.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.session.phase.is_live() {
            return TickOutcome::Ignored;
        }

        self.session.time_remaining_seconds = self.session.time_remaining_seconds.saturating_sub(1);
        let remaining = self.session.time_remaining_seconds;
        if remaining == 0 {
            tracing::info!(
                target: AUDIT,
                exam_id = %self.session.id,
                "[SessionEngine] Time expired"
            );
            self.begin_finalize(FinalizeReason::TimeExpired);
            TickOutcome::Expired
        } else {
            TickOutcome::Running { remaining }
        }
    }

    /// Opens the pre-submit summary.
    ///
    /// Requires the candidate to be on the last question and review to be
    /// enabled by policy.
    pub fn request_review(&mut self) -> Result<()> {
        self.ensure_phase("review", &[Phase::InProgress])?;
        if !self.policy.is_review_enabled {
            return Err(ProctorError::FeatureDisabled("review"));
        }
        if !self.session.navigator.is_at_last() {
            return Err(ProctorError::InvalidTransition {
                phase: self.session.phase,
                action: "review before the last question",
            });
        }
        self.transition(Phase::Reviewing);
        Ok(())
    }

    pub fn resume_from_review(&mut self) -> Result<()> {
        self.ensure_phase("resume", &[Phase::Reviewing])?;
        self.transition(Phase::InProgress);
        Ok(())
    }

    /// Candidate-initiated submission.
    pub fn request_finalize(&mut self) -> Result<bool> {
        self.finalize(FinalizeReason::CandidateSubmit)
    }

    /// Begins finalize. Idempotent.
    ///
    /// Returns `Ok(true)` if this call started finalization, `Ok(false)` if
    /// the session was already submitting or finalized.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` while still `Loading`: there is nothing to submit.
    pub fn finalize(&mut self, reason: FinalizeReason) -> Result<bool> {
        if self.session.phase == Phase::Loading {
            return Err(ProctorError::InvalidTransition {
                phase: Phase::Loading,
                action: "finalize",
            });
        }
        Ok(self.begin_finalize(reason))
    }

    fn begin_finalize(&mut self, reason: FinalizeReason) -> bool {
        if self.session.phase.is_closing() {
            tracing::debug!(
                "[SessionEngine] finalize({}) ignored, already {}",
                reason,
                self.session.phase
            );
            return false;
        }

        self.finalize_reason = Some(reason);
        self.monitor.detach();
        self.transition(Phase::Submitting);
        self.effects.push(EngineEffect::StopTimer);

        let request = SubmissionRequest {
            exam_id: self.session.id.clone(),
            attempt_id: self.session.attempt_id,
            candidate: self.session.candidate.clone(),
            answers: self.session.navigator.answers().clone(),
            violations: self.session.violations.clone(),
            reason,
            requested_at: Utc::now(),
        };

        tracing::info!(
            target: AUDIT,
            exam_id = %self.session.id,
            reason = %reason,
            answers = request.answers.len(),
            violations = request.violation_count(),
            "[SessionEngine] Finalize started"
        );
        self.effects.push(EngineEffect::Submit(request));
        true
    }

    /// Closes the session once the submission pipeline has run, whatever
    /// its outcome.
    pub fn complete_submission(&mut self, receipt: SubmissionReceipt) -> Result<()> {
        match self.session.phase {
            Phase::Submitting => {}
            Phase::Finalized => {
                tracing::warn!("[SessionEngine] Duplicate submission receipt ignored");
                return Ok(());
            }
            phase => {
                return Err(ProctorError::InvalidTransition {
                    phase,
                    action: "complete submission",
                });
            }
        }

        tracing::info!(
            target: AUDIT,
            exam_id = %self.session.id,
            outcome = ?receipt.outcome,
            "[SessionEngine] Session finalized"
        );
        self.receipt = Some(receipt);
        self.finalized_at = Some(Utc::now());
        self.transition(Phase::Finalized);
        Ok(())
    }

    /// The hand-off record, available once finalized.
    pub fn report(&self) -> Option<SessionReport> {
        let (reason, receipt, finalized_at) =
            match (self.finalize_reason, &self.receipt, self.finalized_at) {
                (Some(reason), Some(receipt), Some(at)) => (reason, receipt.clone(), at),
                _ => return None,
            };
        Some(SessionReport {
            exam_id: self.session.id.clone(),
            attempt_id: self.session.attempt_id,
            candidate: self.session.candidate.clone(),
            reason,
            answers: self.session.navigator.answers().clone(),
            violations: self.session.violations.clone(),
            receipt,
            finalized_at,
        })
    }

    // ============================================================================
    // Navigation (candidate actions, InProgress only)
    // ============================================================================

    pub fn go_to(&mut self, index: usize) -> Result<()> {
        self.ensure_phase("navigate", &[Phase::InProgress])?;
        self.session.navigator.go_to(index)
    }

    pub fn next_question(&mut self) -> Result<()> {
        self.ensure_phase("navigate", &[Phase::InProgress])?;
        self.session.navigator.next()
    }

    pub fn previous_question(&mut self) -> Result<()> {
        self.ensure_phase("navigate", &[Phase::InProgress])?;
        self.session.navigator.previous()
    }

    pub fn set_answer(&mut self, question_id: &str, option_index: usize) -> Result<()> {
        self.ensure_phase("answer", &[Phase::InProgress])?;
        self.session.navigator.set_answer(question_id, option_index)?;
        Ok(())
    }

    pub fn toggle_flag(&mut self, question_id: &str) -> Result<bool> {
        self.ensure_phase("flag", &[Phase::InProgress])?;
        self.session.navigator.toggle_flag(question_id)
    }

    /// Evaluates a calculator expression, if policy allows the calculator.
    pub fn evaluate(&self, expression: &str) -> Result<f64> {
        self.ensure_phase("use the calculator", &[Phase::InProgress, Phase::Reviewing])?;
        if !self.policy.is_calculator_enabled {
            return Err(ProctorError::FeatureDisabled("calculator"));
        }
        calculator::evaluate(expression)
    }

    // ============================================================================
    // Views
    // ============================================================================

    pub fn summary(&self) -> ReviewSummary {
        let navigator = &self.session.navigator;
        ReviewSummary {
            answered: navigator.answered_count(),
            flagged: navigator.flagged_count(),
            violations: self.session.violations.len(),
            total_questions: navigator.len(),
            total_marks: navigator.total_marks(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let navigator = &self.session.navigator;
        let current = navigator.current();
        SessionSnapshot {
            exam_id: self.session.id.clone(),
            candidate_name: self.session.candidate.name.clone(),
            candidate_roll_no: self.session.candidate.roll_no.clone(),
            phase: self.session.phase,
            time_remaining_seconds: self.session.time_remaining_seconds,
            current_index: navigator.current_index(),
            total_questions: navigator.len(),
            current_question: current.map(Question::view),
            current_answer: current.and_then(|q| navigator.answer_for(&q.id)),
            current_flagged: current.is_some_and(|q| navigator.is_flagged(&q.id)),
            grid: navigator.grid(),
            violations: self.session.violations.clone(),
            max_violations: self.policy.max_violations,
            camera_degraded: self.session.camera_degraded,
            calculator_enabled: self.policy.is_calculator_enabled,
            review_enabled: self.policy.is_review_enabled,
            summary: self.summary(),
        }
    }

    // ============================================================================
    // Internals
    // ============================================================================

    fn ensure_phase(&self, action: &'static str, allowed: &[Phase]) -> Result<()> {
        if allowed.contains(&self.session.phase) {
            Ok(())
        } else {
            Err(ProctorError::InvalidTransition {
                phase: self.session.phase,
                action,
            })
        }
    }

    fn transition(&mut self, to: Phase) {
        let from = self.session.phase;
        if from == to {
            return;
        }
        self.session.phase = to;
        tracing::debug!("[SessionEngine] Phase {} -> {}", from, to);
        self.effects.push(EngineEffect::PhaseChanged { from, to });
    }
}
