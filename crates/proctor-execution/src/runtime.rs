//! Session actor.
//!
//! One task owns the engine. Commands are handled one at a time; after each
//! command the engine's queued effects are applied (timer control, alerts,
//! the one-shot submission) and a fresh snapshot is published before the
//! next command is read.

use crate::command::{RuntimeEvent, SessionCommand};
use crate::timer::CountdownTimer;
use proctor_application::SubmissionPipeline;
use proctor_core::error::Result;
use proctor_core::exam::{
    CameraFeed, EngineEffect, Phase, PresentationControl, SessionEngine, SessionReport,
    SessionSnapshot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const COMMAND_BUFFER: usize = 64;

/// Collaborators and timings for one runtime.
#[derive(Clone)]
pub struct RuntimeDeps {
    pub pipeline: Arc<SubmissionPipeline>,
    pub presentation: Arc<dyn PresentationControl>,
    pub camera: Arc<dyn CameraFeed>,
    pub tick_interval: Duration,
    /// Pause between `Finalized` and `Finished`
    pub grace_delay: Duration,
}

/// The host's side of a running session.
pub struct SessionHandle {
    pub commands: mpsc::Sender<SessionCommand>,
    pub snapshots: watch::Receiver<SessionSnapshot>,
    pub events: mpsc::UnboundedReceiver<RuntimeEvent>,
    /// Resolves to the report once the session has finished
    pub join: JoinHandle<Option<SessionReport>>,
}

impl SessionHandle {
    /// Sends a command; `false` once the actor has stopped.
    pub async fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).await.is_ok()
    }
}

pub struct SessionRuntime {
    engine: SessionEngine,
    deps: RuntimeDeps,
    timer: CountdownTimer,
    commands: mpsc::Sender<SessionCommand>,
    events: mpsc::UnboundedSender<RuntimeEvent>,
    snapshots: watch::Sender<SessionSnapshot>,
    submission_started: bool,
}

impl SessionRuntime {
    /// Moves a started engine into its own task.
    ///
    /// The actor keeps running until the session is finalized; dropping the
    /// handle does not end the exam early.
    pub fn spawn(engine: SessionEngine, deps: RuntimeDeps) -> SessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(engine.snapshot());

        let runtime = Self {
            engine,
            timer: CountdownTimer::new(deps.tick_interval),
            deps,
            commands: commands_tx.clone(),
            events: events_tx,
            snapshots: snapshots_tx,
            submission_started: false,
        };
        let join = tokio::spawn(runtime.run(commands_rx));

        SessionHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
            events: events_rx,
            join,
        }
    }

    async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) -> Option<SessionReport> {
        if let Err(e) = self.deps.camera.acquire() {
            tracing::warn!("[SessionRuntime] Camera feed unavailable: {}", e);
            self.engine.mark_camera_degraded();
        }
        if let Err(e) = self.deps.presentation.enter_secure_mode().await {
            tracing::warn!("[SessionRuntime] Secure mode request denied: {}", e);
        }
        self.apply_effects();
        self.publish();

        while let Some(command) = commands.recv().await {
            self.handle(command);
            self.apply_effects();
            self.publish();

            if self.engine.phase() == Phase::Finalized {
                return self.finish().await;
            }
        }

        tracing::warn!("[SessionRuntime] Command channel closed before finalize");
        self.timer.stop();
        self.engine.report()
    }

    fn handle(&mut self, command: SessionCommand) {
        let result: Result<()> = match command {
            SessionCommand::Signal(signal) => {
                let verdict = self.engine.observe_signal(&signal);
                tracing::trace!("[SessionRuntime] {:?} -> {:?}", signal, verdict);
                Ok(())
            }
            SessionCommand::Tick { generation } => {
                if self.timer.is_current(generation) {
                    self.engine.tick();
                } else {
                    tracing::debug!("[SessionRuntime] Dropping stale tick from run {}", generation);
                }
                Ok(())
            }
            SessionCommand::GoTo(index) => self.engine.go_to(index),
            SessionCommand::Next => self.engine.next_question(),
            SessionCommand::Previous => self.engine.previous_question(),
            SessionCommand::Answer {
                question_id,
                option_index,
            } => self.engine.set_answer(&question_id, option_index),
            SessionCommand::ToggleFlag(question_id) => {
                self.engine.toggle_flag(&question_id).map(|_| ())
            }
            SessionCommand::RequestReview => self.engine.request_review(),
            SessionCommand::ResumeFromReview => self.engine.resume_from_review(),
            SessionCommand::Submit => self.engine.request_finalize().map(|_| ()),
            SessionCommand::Evaluate { expression, reply } => {
                let _ = reply.send(self.engine.evaluate(&expression));
                Ok(())
            }
            SessionCommand::SubmissionFinished(receipt) => {
                self.engine.complete_submission(receipt)
            }
        };

        if let Err(e) = result {
            tracing::debug!("[SessionRuntime] Command rejected: {}", e);
            self.emit(RuntimeEvent::CommandRejected(e.to_string()));
        }
    }

    fn apply_effects(&mut self) {
        for effect in self.engine.drain_effects() {
            match effect {
                EngineEffect::StartTimer => {
                    self.timer.start(self.commands.clone());
                }
                EngineEffect::StopTimer => {
                    self.timer.stop();
                }
                EngineEffect::Alert(alert) => self.emit(RuntimeEvent::Alert(alert)),
                EngineEffect::PhaseChanged { from, to } => {
                    self.emit(RuntimeEvent::PhaseChanged { from, to })
                }
                EngineEffect::Submit(request) => {
                    if self.submission_started {
                        tracing::error!("[SessionRuntime] Second submission request ignored");
                        continue;
                    }
                    self.submission_started = true;

                    let pipeline = self.deps.pipeline.clone();
                    let commands = self.commands.clone();
                    tokio::spawn(async move {
                        let receipt = pipeline.run(request).await;
                        if commands
                            .send(SessionCommand::SubmissionFinished(receipt))
                            .await
                            .is_err()
                        {
                            tracing::warn!("[SessionRuntime] Runtime gone before receipt arrived");
                        }
                    });
                }
            }
        }
    }

    async fn finish(mut self) -> Option<SessionReport> {
        self.timer.stop();
        tokio::time::sleep(self.deps.grace_delay).await;

        let report = self.engine.report();
        if let Some(report) = &report {
            tracing::info!(
                "[SessionRuntime] Session {} finished ({})",
                report.exam_id,
                report.reason
            );
            self.emit(RuntimeEvent::Finished(report.clone()));
        }
        report
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.engine.snapshot());
    }

    fn emit(&self, event: RuntimeEvent) {
        // The host may have stopped listening; the session still runs to the end
        let _ = self.events.send(event);
    }
}
