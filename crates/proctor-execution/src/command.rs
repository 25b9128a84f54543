use proctor_core::error::Result;
use proctor_core::exam::{HostSignal, Phase, SessionReport, SubmissionReceipt, ViolationAlert};
use tokio::sync::oneshot;

/// Input to the session actor. Processed strictly in arrival order.
#[derive(Debug)]
pub enum SessionCommand {
    /// Raw integrity signal from the host
    Signal(HostSignal),
    /// Timer tick, tagged with the timer run that produced it
    Tick { generation: u64 },
    GoTo(usize),
    Next,
    Previous,
    Answer {
        question_id: String,
        option_index: usize,
    },
    ToggleFlag(String),
    RequestReview,
    ResumeFromReview,
    /// Candidate-initiated submission
    Submit,
    /// Calculator evaluation, answered on `reply`
    Evaluate {
        expression: String,
        reply: oneshot::Sender<Result<f64>>,
    },
    /// Receipt from the submission pipeline
    SubmissionFinished(SubmissionReceipt),
}

/// Output of the session actor for the host UI.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    Alert(ViolationAlert),
    /// A candidate action was refused (e.g. navigating while reviewing)
    CommandRejected(String),
    PhaseChanged { from: Phase, to: Phase },
    /// Emitted once, after the grace delay; the actor stops right after.
    Finished(SessionReport),
}
