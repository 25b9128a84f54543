//! Violation monitor.
//!
//! Translates raw host integrity signals into classified violations. The
//! monitor has an explicit attach/detach lifecycle owned by the engine:
//! it is attached exactly while the session is `InProgress` or `Reviewing`.
//! Signals observed while detached are discarded.

use super::model::ViolationKind;
use serde::{Deserialize, Serialize};

/// Letters that are forbidden in combination with the platform modifier
/// (Ctrl, or Cmd on macOS).
pub const FORBIDDEN_CHORD_KEYS: [&str; 9] = ["c", "v", "x", "u", "i", "j", "s", "p", "a"];

/// Dedicated developer-tools key, forbidden on its own.
pub const DEV_TOOLS_KEY: &str = "F12";

/// A key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyChord {
    /// Key name (`"c"`, `"F12"`, `"ArrowLeft"` ...)
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyChord {
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            meta: false,
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: true,
            meta: false,
        }
    }

    /// Whether the chord belongs to the forbidden set.
    pub fn is_forbidden(&self) -> bool {
        if self.key == DEV_TOOLS_KEY {
            return true;
        }
        let lowered = self.key.to_lowercase();
        (self.ctrl || self.meta) && FORBIDDEN_CHORD_KEYS.contains(&lowered.as_str())
    }
}

/// Boundary inputs the monitor subscribes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostSignal {
    ContextMenu,
    TextSelectStart,
    Copy,
    Paste,
    Cut,
    KeyDown(KeyChord),
    VisibilityChange { hidden: bool },
    WindowBlur,
    FullscreenChange { active: bool },
}

/// What the host should do with a signal, and what it means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalVerdict {
    /// The host must cancel the underlying action
    pub cancel: bool,
    /// Violation to record, if any
    pub violation: Option<ViolationKind>,
}

impl SignalVerdict {
    pub fn ignored() -> Self {
        Self::default()
    }

    fn suppressed() -> Self {
        Self {
            cancel: true,
            violation: None,
        }
    }

    fn violation(kind: ViolationKind, cancel: bool) -> Self {
        Self {
            cancel,
            violation: Some(kind),
        }
    }
}

/// Classifies host signals while attached.
///
/// Every occurrence is classified independently; there is no debouncing.
/// Tolerance is the escalation policy's job.
#[derive(Debug, Clone, Default)]
pub struct ViolationMonitor {
    attached: bool,
    escalate_suppressed: bool,
}

impl ViolationMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records clipboard and context-menu attempts as violations instead of
    /// only suppressing them.
    pub fn with_escalated_suppression(mut self, escalate: bool) -> Self {
        self.escalate_suppressed = escalate;
        self
    }

    pub fn attach(&mut self) {
        if !self.attached {
            tracing::debug!("[ViolationMonitor] Attached");
        }
        self.attached = true;
    }

    pub fn detach(&mut self) {
        if self.attached {
            tracing::debug!("[ViolationMonitor] Detached");
        }
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn observe(&self, signal: &HostSignal) -> SignalVerdict {
        if !self.attached {
            return SignalVerdict::ignored();
        }

        match signal {
            HostSignal::ContextMenu => self.suppress(ViolationKind::ContextMenu),
            HostSignal::Copy | HostSignal::Paste | HostSignal::Cut => {
                self.suppress(ViolationKind::ClipboardAttempt)
            }
            HostSignal::TextSelectStart => SignalVerdict::suppressed(),
            HostSignal::KeyDown(chord) if chord.is_forbidden() => {
                SignalVerdict::violation(ViolationKind::ForbiddenKey, true)
            }
            HostSignal::KeyDown(_) => SignalVerdict::ignored(),
            HostSignal::VisibilityChange { hidden: true } => {
                SignalVerdict::violation(ViolationKind::TabHidden, false)
            }
            HostSignal::VisibilityChange { hidden: false } => SignalVerdict::ignored(),
            HostSignal::WindowBlur => SignalVerdict::violation(ViolationKind::WindowBlur, false),
            HostSignal::FullscreenChange { active: false } => {
                SignalVerdict::violation(ViolationKind::FullscreenExit, false)
            }
            HostSignal::FullscreenChange { active: true } => SignalVerdict::ignored(),
        }
    }

    fn suppress(&self, kind: ViolationKind) -> SignalVerdict {
        if self.escalate_suppressed {
            SignalVerdict::violation(kind, true)
        } else {
            SignalVerdict::suppressed()
        }
    }
}
