#[cfg(test)]
mod tests {
    use crate::error::ProctorError;
    use crate::exam::engine::{EngineEffect, SessionEngine, TickOutcome, ViolationOutcome};
    use crate::exam::model::{
        Candidate, FinalizeReason, Phase, Question, QuestionPart, ViolationKind,
    };
    use crate::exam::monitor::{HostSignal, KeyChord};
    use crate::exam::policy::ExamPolicy;
    use crate::exam::submission::{SubmissionOutcome, SubmissionReceipt};
    use chrono::Utc;

    fn questions(count: usize) -> Vec<Question> {
        (0..count)
            .map(|i| Question {
                id: format!("q-{i}"),
                text: format!("Question {i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer_index: 0,
                image_ref: None,
                part: QuestionPart::A,
            })
            .collect()
    }

    fn policy(minutes: u32, max_violations: u32) -> ExamPolicy {
        ExamPolicy {
            total_time_minutes: minutes,
            max_violations,
            is_calculator_enabled: true,
            is_review_enabled: true,
        }
    }

    fn started(minutes: u32, max_violations: u32) -> SessionEngine {
        let mut engine = SessionEngine::new("SEM-APR-2024", Candidate::new("21CS001", "Asha"));
        engine
            .start(questions(3), policy(minutes, max_violations))
            .expect("session should start");
        engine.drain_effects();
        engine
    }

    fn submit_count(effects: &[EngineEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, EngineEffect::Submit(_)))
            .count()
    }

    fn receipt() -> SubmissionReceipt {
        SubmissionReceipt {
            outcome: SubmissionOutcome::Acknowledged,
            presentation_exited: true,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_start_sets_clock_and_phase() {
        let mut engine = SessionEngine::new("exam", Candidate::new("r1", "n1"));
        assert_eq!(engine.phase(), Phase::Loading);

        engine.start(questions(2), policy(1, 3)).unwrap();

        assert_eq!(engine.phase(), Phase::InProgress);
        assert_eq!(engine.session().time_remaining_seconds(), 60);
        assert!(engine.monitor().is_attached());
        let effects = engine.drain_effects();
        assert!(effects.contains(&EngineEffect::StartTimer));
        assert!(effects.contains(&EngineEffect::PhaseChanged {
            from: Phase::Loading,
            to: Phase::InProgress
        }));
    }

    #[test]
    fn test_start_without_questions_is_config_error() {
        let mut engine = SessionEngine::new("exam", Candidate::new("r1", "n1"));
        let err = engine.start(Vec::new(), policy(1, 3)).unwrap_err();
        assert!(err.is_config());
        assert_eq!(engine.phase(), Phase::Loading);
    }

    #[test]
    fn test_start_rejects_duplicate_ids_and_double_start() {
        let mut engine = SessionEngine::new("exam", Candidate::new("r1", "n1"));
        let mut dupes = questions(2);
        dupes[1].id = dupes[0].id.clone();
        assert!(engine.start(dupes, policy(1, 3)).unwrap_err().is_config());

        engine.start(questions(2), policy(1, 3)).unwrap();
        assert!(
            engine
                .start(questions(2), policy(1, 3))
                .unwrap_err()
                .is_invalid_transition()
        );
    }

    #[test]
    fn test_three_blurs_reach_threshold() {
        let mut engine = started(1, 3);

        assert_eq!(
            engine.record_violation(ViolationKind::WindowBlur),
            ViolationOutcome::Recorded { count: 1 }
        );
        assert_eq!(
            engine.record_violation(ViolationKind::WindowBlur),
            ViolationOutcome::Recorded { count: 2 }
        );
        assert_eq!(engine.phase(), Phase::InProgress);
        assert_eq!(
            engine.record_violation(ViolationKind::WindowBlur),
            ViolationOutcome::ThresholdReached { count: 3 }
        );

        assert_eq!(engine.phase(), Phase::Submitting);
        assert_eq!(engine.session().violations().len(), 3);
        assert_eq!(engine.finalize_reason(), Some(FinalizeReason::ThresholdExceeded));
        assert!(!engine.monitor().is_attached());
    }

    #[test]
    fn test_violation_count_grows_by_one_until_closed() {
        let mut engine = started(5, 4);
        for expected in 1..=4 {
            engine.record_violation(ViolationKind::TabHidden);
            assert_eq!(engine.session().violations().len(), expected);
        }
        assert_eq!(engine.phase(), Phase::Submitting);

        // Further calls are discarded and the phase stays closed.
        for _ in 0..3 {
            assert_eq!(
                engine.record_violation(ViolationKind::TabHidden),
                ViolationOutcome::Ignored
            );
        }
        assert_eq!(engine.session().violations().len(), 4);
        assert_eq!(engine.phase(), Phase::Submitting);

        engine.complete_submission(receipt()).unwrap();
        engine.record_violation(ViolationKind::WindowBlur);
        assert_eq!(engine.session().violations().len(), 4);
        assert_eq!(engine.phase(), Phase::Finalized);
    }

    #[test]
    fn test_every_violation_is_alerted() {
        let mut engine = started(1, 2);
        engine.record_violation(ViolationKind::ForbiddenKey);
        engine.record_violation(ViolationKind::FullscreenExit);

        let alerts: Vec<_> = engine
            .drain_effects()
            .into_iter()
            .filter_map(|e| match e {
                EngineEffect::Alert(alert) => Some(alert),
                _ => None,
            })
            .collect();
        assert_eq!(alerts.len(), 2);
        assert!(!alerts[0].escalated);
        assert_eq!(alerts[0].message, "Unauthorized Keyboard Input");
        assert!(alerts[1].escalated);
        assert_eq!(alerts[1].count, 2);
    }

    #[test]
    fn test_sixty_ticks_expire_one_minute() {
        let mut engine = started(1, 3);
        for i in 1..60 {
            assert_eq!(
                engine.tick(),
                TickOutcome::Running {
                    remaining: 60 - i
                }
            );
            assert_eq!(engine.phase(), Phase::InProgress);
        }
        assert_eq!(engine.tick(), TickOutcome::Expired);
        assert_eq!(engine.phase(), Phase::Submitting);
        assert_eq!(engine.session().time_remaining_seconds(), 0);
        assert_eq!(engine.finalize_reason(), Some(FinalizeReason::TimeExpired));
    }

    #[test]
    fn test_tick_after_finalize_does_not_decrement() {
        let mut engine = started(1, 3);
        engine.tick();
        engine.request_finalize().unwrap();
        let remaining = engine.session().time_remaining_seconds();

        assert_eq!(engine.tick(), TickOutcome::Ignored);
        assert_eq!(engine.session().time_remaining_seconds(), remaining);
    }

    #[test]
    fn test_ticks_continue_while_reviewing() {
        let mut engine = started(1, 3);
        engine.go_to(2).unwrap();
        engine.request_review().unwrap();
        assert_eq!(engine.tick(), TickOutcome::Running { remaining: 59 });
    }

    #[test]
    fn test_racing_finalize_triggers_submit_once() {
        let mut engine = started(1, 1);
        for _ in 0..59 {
            engine.tick();
        }
        engine.drain_effects();

        // Last-straw violation and timer expiry at the same logical moment.
        engine.record_violation(ViolationKind::WindowBlur);
        engine.tick();
        engine.finalize(FinalizeReason::TimeExpired).unwrap();
        engine.request_finalize().unwrap();

        let effects = engine.drain_effects();
        assert_eq!(submit_count(&effects), 1);
        assert_eq!(engine.finalize_reason(), Some(FinalizeReason::ThresholdExceeded));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut engine = started(1, 3);
        assert!(engine.request_finalize().unwrap());
        assert!(!engine.request_finalize().unwrap());
        assert!(!engine.finalize(FinalizeReason::TimeExpired).unwrap());

        let effects = engine.drain_effects();
        assert_eq!(submit_count(&effects), 1);
        assert!(effects.contains(&EngineEffect::StopTimer));
    }

    #[test]
    fn test_finalize_while_loading_is_rejected() {
        let mut engine = SessionEngine::new("exam", Candidate::new("r1", "n1"));
        assert!(
            engine
                .finalize(FinalizeReason::CandidateSubmit)
                .unwrap_err()
                .is_invalid_transition()
        );
    }

    #[test]
    fn test_submit_snapshot_contents() {
        let mut engine = started(1, 3);
        engine.set_answer("q-0", 1).unwrap();
        engine.set_answer("q-2", 3).unwrap();
        engine.record_violation(ViolationKind::TabHidden);
        engine.request_finalize().unwrap();

        let request = engine
            .drain_effects()
            .into_iter()
            .find_map(|e| match e {
                EngineEffect::Submit(request) => Some(request),
                _ => None,
            })
            .expect("submit effect");
        assert_eq!(request.exam_id, "SEM-APR-2024");
        assert_eq!(request.candidate.roll_no, "21CS001");
        assert_eq!(request.answers.len(), 2);
        assert_eq!(request.violation_count(), 1);
        assert_eq!(request.reason, FinalizeReason::CandidateSubmit);
    }

    #[test]
    fn test_complete_submission_finalizes_and_reports() {
        let mut engine = started(1, 3);
        assert!(engine.report().is_none());
        engine.request_finalize().unwrap();
        engine.complete_submission(receipt()).unwrap();

        assert_eq!(engine.phase(), Phase::Finalized);
        let report = engine.report().expect("report once finalized");
        assert_eq!(report.reason, FinalizeReason::CandidateSubmit);
        assert!(report.receipt.outcome.is_acknowledged());

        // A duplicate receipt is harmless.
        engine.complete_submission(receipt()).unwrap();
        assert_eq!(engine.phase(), Phase::Finalized);
    }

    #[test]
    fn test_complete_submission_requires_submitting() {
        let mut engine = started(1, 3);
        assert!(
            engine
                .complete_submission(receipt())
                .unwrap_err()
                .is_invalid_transition()
        );
    }

    #[test]
    fn test_set_answer_twice_keeps_latest() {
        let mut engine = started(1, 3);
        engine.set_answer("q-1", 0).unwrap();
        engine.set_answer("q-1", 2).unwrap();
        let answers = engine.session().navigator().answers();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get("q-1"), Some(&2));
    }

    #[test]
    fn test_answers_frozen_after_finalize() {
        let mut engine = started(1, 3);
        engine.request_finalize().unwrap();
        let err = engine.set_answer("q-0", 1).unwrap_err();
        assert!(matches!(
            err,
            ProctorError::InvalidTransition {
                phase: Phase::Submitting,
                ..
            }
        ));
        assert!(engine.toggle_flag("q-0").is_err());
        assert!(engine.next_question().is_err());
    }

    #[test]
    fn test_review_round_trip() {
        let mut engine = started(1, 3);
        assert!(engine.request_review().is_err());

        engine.go_to(2).unwrap();
        engine.request_review().unwrap();
        assert_eq!(engine.phase(), Phase::Reviewing);
        assert!(engine.set_answer("q-0", 1).is_err());

        engine.resume_from_review().unwrap();
        assert_eq!(engine.phase(), Phase::InProgress);
        assert!(engine.resume_from_review().is_err());
    }

    #[test]
    fn test_review_disabled_by_policy() {
        let mut engine = SessionEngine::new("exam", Candidate::new("r1", "n1"));
        let mut no_review = policy(1, 3);
        no_review.is_review_enabled = false;
        engine.start(questions(1), no_review).unwrap();
        assert_eq!(
            engine.request_review().unwrap_err(),
            ProctorError::FeatureDisabled("review")
        );
        assert!(engine.request_finalize().unwrap());
    }

    #[test]
    fn test_violations_in_review_still_escalate() {
        let mut engine = started(1, 1);
        engine.go_to(2).unwrap();
        engine.request_review().unwrap();
        engine.record_violation(ViolationKind::WindowBlur);
        assert_eq!(engine.phase(), Phase::Submitting);
    }

    #[test]
    fn test_observe_signal_routes_through_monitor() {
        let mut engine = started(1, 3);
        let verdict = engine.observe_signal(&HostSignal::KeyDown(KeyChord::ctrl("v")));
        assert!(verdict.cancel);
        assert_eq!(engine.session().violations().len(), 1);

        let verdict = engine.observe_signal(&HostSignal::Copy);
        assert!(verdict.cancel);
        assert_eq!(engine.session().violations().len(), 1);

        engine.request_finalize().unwrap();
        let verdict = engine.observe_signal(&HostSignal::WindowBlur);
        assert!(verdict.violation.is_none());
        assert_eq!(engine.session().violations().len(), 1);
    }

    #[test]
    fn test_signals_before_start_are_discarded() {
        let mut engine = SessionEngine::new("exam", Candidate::new("r1", "n1"));
        engine.observe_signal(&HostSignal::WindowBlur);
        assert_eq!(
            engine.record_violation(ViolationKind::WindowBlur),
            ViolationOutcome::Ignored
        );
        assert!(engine.session().violations().is_empty());
    }

    #[test]
    fn test_camera_degraded_is_not_a_violation() {
        let mut engine = started(1, 3);
        engine.mark_camera_degraded();
        assert!(engine.session().camera_degraded());
        assert!(engine.session().violations().is_empty());
        assert!(engine.snapshot().camera_degraded);
    }

    #[test]
    fn test_snapshot_reflects_navigation() {
        let mut engine = started(1, 3);
        engine.set_answer("q-0", 2).unwrap();
        engine.toggle_flag("q-0").unwrap();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.current_answer, Some(2));
        assert!(snapshot.current_flagged);
        assert_eq!(snapshot.summary.answered, 1);
        assert_eq!(snapshot.summary.flagged, 1);
        assert_eq!(snapshot.total_questions, 3);
        assert_eq!(
            snapshot.current_question.map(|q| q.id),
            Some("q-0".to_string())
        );
    }

    #[test]
    fn test_calculator_gated_by_policy() {
        let mut engine = started(1, 3);
        assert_eq!(engine.evaluate("2+3*4").unwrap(), 14.0);

        let mut engine_off = SessionEngine::new("exam", Candidate::new("r1", "n1"));
        let mut no_calc = policy(1, 3);
        no_calc.is_calculator_enabled = false;
        engine_off.start(questions(1), no_calc).unwrap();
        assert_eq!(
            engine_off.evaluate("1+1").unwrap_err(),
            ProctorError::FeatureDisabled("calculator")
        );

        engine.request_finalize().unwrap();
        assert!(engine.evaluate("1+1").is_err());
    }
}
