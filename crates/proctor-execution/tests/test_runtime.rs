use async_trait::async_trait;
use proctor_application::SubmissionPipeline;
use proctor_core::error::{ProctorError, Result};
use proctor_core::exam::{
    CameraFeed, Candidate, ExamBackend, ExamPolicy, FinalizeReason, HostSignal, Phase,
    PresentationControl, Question, ResultPayload, SessionEngine, SubmissionOutcome,
    placeholder_questions,
};
use proctor_execution::{RuntimeDeps, RuntimeEvent, SessionCommand, SessionHandle, SessionRuntime};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Default)]
struct CountingBackend {
    submissions: AtomicUsize,
}

#[async_trait]
impl ExamBackend for CountingBackend {
    async fn fetch_questions(&self, _exam_id: &str) -> Result<Vec<Question>> {
        Ok(vec![])
    }

    async fn submit_result(&self, _payload: &ResultPayload) -> Result<SubmissionOutcome> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(SubmissionOutcome::Acknowledged)
    }
}

#[derive(Default)]
struct CountingPresentation {
    entered: AtomicUsize,
    exited: AtomicUsize,
}

#[async_trait]
impl PresentationControl for CountingPresentation {
    async fn enter_secure_mode(&self) -> Result<()> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exit_secure_mode(&self) -> Result<()> {
        self.exited.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Camera {
    available: bool,
}

impl CameraFeed for Camera {
    fn acquire(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(ProctorError::internal("no video device"))
        }
    }
}

struct Harness {
    handle: SessionHandle,
    backend: Arc<CountingBackend>,
    presentation: Arc<CountingPresentation>,
}

fn launch(policy: ExamPolicy, camera_available: bool) -> Harness {
    let mut engine = SessionEngine::new("SEM-APR-2024", Candidate::new("21CS042", "Asha"));
    engine.start(placeholder_questions(), policy).unwrap();

    let backend = Arc::new(CountingBackend::default());
    let presentation = Arc::new(CountingPresentation::default());
    let deps = RuntimeDeps {
        pipeline: Arc::new(SubmissionPipeline::new(backend.clone(), presentation.clone())),
        presentation: presentation.clone(),
        camera: Arc::new(Camera {
            available: camera_available,
        }),
        tick_interval: Duration::from_secs(1),
        grace_delay: Duration::from_secs(2),
    };

    Harness {
        handle: SessionRuntime::spawn(engine, deps),
        backend,
        presentation,
    }
}

fn one_minute(max_violations: u32) -> ExamPolicy {
    ExamPolicy {
        total_time_minutes: 1,
        max_violations,
        ..ExamPolicy::default()
    }
}

fn drain_events(handle: &mut SessionHandle) -> Vec<RuntimeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = handle.events.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_sixty_ticks_expire_one_minute_exam() {
    let Harness {
        handle,
        backend,
        presentation,
    } = launch(one_minute(3), true);

    let report = handle.join.await.unwrap().expect("report");

    assert_eq!(report.reason, FinalizeReason::TimeExpired);
    assert!(report.violations.is_empty());
    assert_eq!(backend.submissions.load(Ordering::SeqCst), 1);
    assert_eq!(presentation.entered.load(Ordering::SeqCst), 1);
    assert_eq!(presentation.exited.load(Ordering::SeqCst), 1);

    let snapshot = handle.snapshots.borrow().clone();
    assert_eq!(snapshot.phase, Phase::Finalized);
    assert_eq!(snapshot.time_remaining_seconds, 0);
}

#[tokio::test(start_paused = true)]
async fn test_three_blurs_terminate_session() {
    let Harness {
        mut handle,
        backend,
        ..
    } = launch(one_minute(3), true);

    for _ in 0..3 {
        assert!(handle.send(SessionCommand::Signal(HostSignal::WindowBlur)).await);
    }
    let report = (&mut handle.join).await.unwrap().expect("report");

    assert_eq!(report.reason, FinalizeReason::ThresholdExceeded);
    assert_eq!(report.violations.len(), 3);
    assert_eq!(backend.submissions.load(Ordering::SeqCst), 1);

    let events = drain_events(&mut handle);
    let alerts: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            RuntimeEvent::Alert(alert) => Some(alert),
            _ => None,
        })
        .collect();
    assert_eq!(alerts.len(), 3);
    assert!(alerts[2].escalated);
    assert!(!alerts[1].escalated);
    assert!(matches!(events.last(), Some(RuntimeEvent::Finished(_))));
}

#[tokio::test(start_paused = true)]
async fn test_racing_finalize_requests_submit_once() {
    let Harness {
        handle, backend, ..
    } = launch(one_minute(1), true);

    handle.send(SessionCommand::Submit).await;
    handle.send(SessionCommand::Signal(HostSignal::WindowBlur)).await;
    handle.send(SessionCommand::Submit).await;

    let report = handle.join.await.unwrap().expect("report");
    assert_eq!(report.reason, FinalizeReason::CandidateSubmit);
    assert!(report.violations.is_empty());
    assert_eq!(backend.submissions.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_answers_after_submit_are_rejected() {
    let Harness { mut handle, .. } = launch(one_minute(3), true);
    let first = handle.snapshots.borrow().current_question.clone().unwrap();

    handle
        .send(SessionCommand::Answer {
            question_id: first.id.clone(),
            option_index: 1,
        })
        .await;
    handle.send(SessionCommand::Submit).await;
    handle
        .send(SessionCommand::Answer {
            question_id: first.id.clone(),
            option_index: 2,
        })
        .await;

    let report = (&mut handle.join).await.unwrap().expect("report");
    assert_eq!(report.answers.get(&first.id), Some(&1));
    assert!(
        drain_events(&mut handle)
            .iter()
            .any(|e| matches!(e, RuntimeEvent::CommandRejected(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn test_stale_ticks_do_not_reach_engine() {
    let Harness { handle, .. } = launch(ExamPolicy::default(), true);

    for _ in 0..5 {
        handle.send(SessionCommand::Tick { generation: 42 }).await;
    }
    // Round-trip through the actor so the ticks above have been handled
    let (reply, answer) = oneshot::channel();
    handle
        .send(SessionCommand::Evaluate {
            expression: "1 + 1".to_string(),
            reply,
        })
        .await;
    assert_eq!(answer.await.unwrap().unwrap(), 2.0);

    let snapshot = handle.snapshots.borrow().clone();
    assert_eq!(snapshot.phase, Phase::InProgress);
    assert_eq!(snapshot.time_remaining_seconds, 40 * 60);
}

#[tokio::test(start_paused = true)]
async fn test_missing_camera_degrades_without_violation() {
    let Harness { handle, .. } = launch(ExamPolicy::default(), false);

    let (reply, answer) = oneshot::channel();
    handle
        .send(SessionCommand::Evaluate {
            expression: "sqrt(16)".to_string(),
            reply,
        })
        .await;
    assert_eq!(answer.await.unwrap().unwrap(), 4.0);

    let snapshot = handle.snapshots.borrow().clone();
    assert!(snapshot.camera_degraded);
    assert!(snapshot.violations.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_review_round_trip() {
    let Harness { mut handle, .. } = launch(ExamPolicy::default(), true);
    let last = handle.snapshots.borrow().total_questions - 1;

    handle.send(SessionCommand::RequestReview).await;
    handle.send(SessionCommand::GoTo(last)).await;
    handle.send(SessionCommand::RequestReview).await;

    let (reply, answer) = oneshot::channel();
    handle
        .send(SessionCommand::Evaluate {
            expression: "2 * 3".to_string(),
            reply,
        })
        .await;
    assert_eq!(answer.await.unwrap().unwrap(), 6.0);
    assert_eq!(handle.snapshots.borrow().phase, Phase::Reviewing);

    handle.send(SessionCommand::ResumeFromReview).await;
    handle.send(SessionCommand::Submit).await;
    let report = (&mut handle.join).await.unwrap().expect("report");
    assert_eq!(report.reason, FinalizeReason::CandidateSubmit);

    let events = drain_events(&mut handle);
    // First review request was refused: not on the last question yet
    assert!(
        events
            .iter()
            .any(|e| matches!(e, RuntimeEvent::CommandRejected(_)))
    );
    assert!(events.iter().any(|e| matches!(
        e,
        RuntimeEvent::PhaseChanged {
            from: Phase::InProgress,
            to: Phase::Reviewing
        }
    )));
}
