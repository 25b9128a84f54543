//! The terminal as exam host.
//!
//! Secure presentation mode is the alternate screen in raw mode with focus
//! reporting, bracketed paste and mouse capture enabled. Terminal events are
//! translated into host integrity signals or candidate key presses.

use async_trait::async_trait;
use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
    EnableFocusChange, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{cursor, execute};
use proctor_core::error::{ProctorError, Result};
use proctor_core::exam::{CameraFeed, DEV_TOOLS_KEY, HostSignal, KeyChord, PresentationControl};
use std::sync::atomic::{AtomicBool, Ordering};

/// What a terminal event means for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Signal(HostSignal),
    /// An ordinary key press for the exam screen
    Input(KeyEvent),
    Redraw,
}

/// Maps a raw terminal event. `None` for events with no meaning here.
pub fn translate(event: Event) -> Option<HostEvent> {
    match event {
        Event::FocusLost => Some(HostEvent::Signal(HostSignal::WindowBlur)),
        Event::FocusGained => Some(HostEvent::Redraw),
        Event::Resize(_, _) => Some(HostEvent::Redraw),
        Event::Paste(_) => Some(HostEvent::Signal(HostSignal::Paste)),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(MouseButton::Right) => {
                Some(HostEvent::Signal(HostSignal::ContextMenu))
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                Some(HostEvent::Signal(HostSignal::TextSelectStart))
            }
            _ => None,
        },
        Event::Key(key) if key.kind != KeyEventKind::Release => translate_key(key),
        Event::Key(_) => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<HostEvent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let meta = key.modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META);

    match key.code {
        KeyCode::F(12) => Some(HostEvent::Signal(HostSignal::KeyDown(KeyChord::plain(
            DEV_TOOLS_KEY,
        )))),
        // Leaving the alternate screen is the terminal's way out of full screen
        KeyCode::Esc => Some(HostEvent::Signal(HostSignal::FullscreenChange {
            active: false,
        })),
        KeyCode::Char(c) if ctrl || meta => Some(HostEvent::Signal(HostSignal::KeyDown(
            KeyChord {
                key: c.to_ascii_lowercase().to_string(),
                ctrl,
                meta,
            },
        ))),
        _ => Some(HostEvent::Input(key)),
    }
}

/// [`PresentationControl`] over the controlling terminal.
#[derive(Default)]
pub struct TerminalPresentation {
    active: AtomicBool,
}

impl TerminalPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Marks secure mode on only once `switch` has fully succeeded.
    fn activate_with(&self, switch: impl FnOnce() -> std::io::Result<()>) -> Result<bool> {
        if self.is_active() {
            return Ok(false);
        }
        switch().map_err(|e| ProctorError::presentation(e.to_string()))?;
        self.active.store(true, Ordering::SeqCst);
        Ok(true)
    }

    /// Restores the terminal if secure mode is still on. Used on error paths.
    pub fn restore(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            if let Err(e) = leave() {
                tracing::warn!("[TerminalPresentation] Restore failed: {}", e);
            }
        }
    }
}

fn enter() -> std::io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    let switched = execute!(
        stdout,
        EnterAlternateScreen,
        EnableFocusChange,
        EnableBracketedPaste,
        EnableMouseCapture,
        cursor::Hide
    );
    if switched.is_err() {
        // Half-entered; put the terminal back before reporting
        let _ = leave();
    }
    switched
}

fn leave() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        DisableMouseCapture,
        DisableBracketedPaste,
        DisableFocusChange,
        LeaveAlternateScreen,
        cursor::Show
    )?;
    disable_raw_mode()
}

#[async_trait]
impl PresentationControl for TerminalPresentation {
    async fn enter_secure_mode(&self) -> Result<()> {
        if self.activate_with(enter)? {
            tracing::info!("[TerminalPresentation] Secure mode on");
        }
        Ok(())
    }

    async fn exit_secure_mode(&self) -> Result<()> {
        if !self.active.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        leave().map_err(|e| ProctorError::presentation(e.to_string()))?;
        tracing::info!("[TerminalPresentation] Secure mode off");
        Ok(())
    }
}

/// No video capture in a terminal: every session runs degraded.
pub struct NoCamera;

impl CameraFeed for NoCamera {
    fn acquire(&self) -> Result<()> {
        Err(ProctorError::not_found("camera", "terminal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn signal(event: Event) -> Option<HostSignal> {
        match translate(event) {
            Some(HostEvent::Signal(signal)) => Some(signal),
            _ => None,
        }
    }

    #[test]
    fn test_chords_become_key_signals() {
        assert_eq!(
            signal(key(KeyCode::Char('C'), KeyModifiers::CONTROL)),
            Some(HostSignal::KeyDown(KeyChord::ctrl("c")))
        );
        assert_eq!(
            signal(key(KeyCode::F(12), KeyModifiers::NONE)),
            Some(HostSignal::KeyDown(KeyChord::plain("F12")))
        );
    }

    #[test]
    fn test_focus_and_paste() {
        assert_eq!(signal(Event::FocusLost), Some(HostSignal::WindowBlur));
        assert_eq!(
            signal(Event::Paste("answer".to_string())),
            Some(HostSignal::Paste)
        );
        assert_eq!(translate(Event::FocusGained), Some(HostEvent::Redraw));
    }

    #[test]
    fn test_escape_leaves_full_screen() {
        assert_eq!(
            signal(key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(HostSignal::FullscreenChange { active: false })
        );
    }

    #[test]
    fn test_right_click_is_context_menu() {
        let event = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Right),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(signal(event), Some(HostSignal::ContextMenu));
    }

    #[test]
    fn test_failed_switch_leaves_presentation_inactive() {
        let presentation = TerminalPresentation::new();
        let result = presentation.activate_with(|| {
            Err(std::io::Error::other("not a tty"))
        });

        assert!(matches!(result, Err(ProctorError::PresentationMode(_))));
        assert!(!presentation.is_active());
        // Nothing to undo, so restore must not touch the terminal
        presentation.restore();
        assert!(!presentation.is_active());
    }

    #[test]
    fn test_switch_runs_once_while_active() {
        let presentation = TerminalPresentation::new();
        let mut calls = 0;
        assert!(presentation.activate_with(|| {
            calls += 1;
            Ok(())
        }).unwrap());
        assert!(!presentation.activate_with(|| {
            calls += 1;
            Ok(())
        }).unwrap());

        assert_eq!(calls, 1);
        assert!(presentation.is_active());
    }

    #[test]
    fn test_plain_keys_are_input() {
        assert!(matches!(
            translate(key(KeyCode::Char('2'), KeyModifiers::NONE)),
            Some(HostEvent::Input(_))
        ));
        assert!(matches!(
            translate(key(KeyCode::Right, KeyModifiers::NONE)),
            Some(HostEvent::Input(_))
        ));
    }
}
