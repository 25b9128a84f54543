//! Interactive exam screen on the controlling terminal.

pub mod host;
pub mod render;
pub mod ui;

use crate::commands::calc::format_value;
use anyhow::Result;
use crossterm::event::EventStream;
use futures::StreamExt;
use host::HostEvent;
use proctor_core::exam::SessionReport;
use proctor_execution::{RuntimeEvent, SessionCommand, SessionHandle};
use tokio::sync::oneshot;
use ui::{ExamUi, UiAction};

/// Runs the exam screen until the session finishes.
///
/// There is no quit key: the screen only returns once the runtime reports
/// the session finished.
pub async fn drive(mut handle: SessionHandle) -> Result<Option<SessionReport>> {
    let mut stdout = std::io::stdout();
    let mut reader = EventStream::new();
    let mut ui = ExamUi::new();
    let mut terminal_open = true;

    render::render(&mut stdout, &handle.snapshots.borrow(), &ui)?;

    loop {
        tokio::select! {
            maybe_event = reader.next(), if terminal_open => {
                let event = match maybe_event {
                    Some(Ok(event)) => event,
                    Some(Err(e)) => {
                        tracing::warn!("[ExamScreen] Terminal read failed: {}", e);
                        continue;
                    }
                    None => {
                        tracing::warn!("[ExamScreen] Terminal input closed");
                        terminal_open = false;
                        continue;
                    }
                };

                match host::translate(event) {
                    Some(HostEvent::Signal(signal)) => {
                        handle.send(SessionCommand::Signal(signal)).await;
                    }
                    Some(HostEvent::Input(key)) => {
                        let snapshot = handle.snapshots.borrow().clone();
                        match ui.on_key(key, &snapshot) {
                            UiAction::Command(command) => {
                                handle.send(command).await;
                            }
                            UiAction::Evaluate(expression) => {
                                ui.calc_result = Some(evaluate(&handle, expression).await);
                            }
                            UiAction::Redraw | UiAction::Nothing => {}
                        }
                    }
                    Some(HostEvent::Redraw) | None => {}
                }
            }
            changed = handle.snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            event = handle.events.recv() => match event {
                Some(RuntimeEvent::Alert(alert)) => ui.alert = Some(alert),
                Some(RuntimeEvent::CommandRejected(reason)) => ui.notice = Some(reason),
                Some(RuntimeEvent::PhaseChanged { from, to }) => {
                    tracing::debug!("[ExamScreen] {} -> {}", from, to);
                }
                Some(RuntimeEvent::Finished(_)) | None => break,
            },
        }

        render::render(&mut stdout, &handle.snapshots.borrow(), &ui)?;
    }

    Ok(handle.join.await?)
}

async fn evaluate(handle: &SessionHandle, expression: String) -> String {
    let (reply, answer) = oneshot::channel();
    if !handle
        .send(SessionCommand::Evaluate { expression, reply })
        .await
    {
        return "unavailable".to_string();
    }
    match answer.await {
        Ok(Ok(value)) => format!("= {}", format_value(value)),
        Ok(Err(e)) => e.to_string(),
        Err(_) => "unavailable".to_string(),
    }
}
