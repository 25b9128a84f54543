//! Configuration model (`settings.toml`).

use crate::exam::{ExamPolicy, ViolationMonitor};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ProctorConfig {
    #[serde(default)]
    pub exam: ExamSettings,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Exam settings as maintained by the settings collaborator.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExamSettings {
    pub exam_id: String,
    pub total_time_minutes: u32,
    pub max_violations: u32,
    /// Part A questions drawn from the bank (0 together with `part_b_count`
    /// means the whole bank)
    pub part_a_count: usize,
    pub part_b_count: usize,
    pub is_review_enabled: bool,
    pub is_calculator_enabled: bool,
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            exam_id: "SEM-APR-2024".to_string(),
            total_time_minutes: 40,
            max_violations: 3,
            part_a_count: 10,
            part_b_count: 5,
            is_review_enabled: true,
            is_calculator_enabled: true,
        }
    }
}

impl ExamSettings {
    pub fn policy(&self) -> ExamPolicy {
        ExamPolicy {
            total_time_minutes: self.total_time_minutes,
            max_violations: self.max_violations,
            is_calculator_enabled: self.is_calculator_enabled,
            is_review_enabled: self.is_review_enabled,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Exam Backend Service endpoint; empty runs in offline (mock) mode
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: 15,
        }
    }
}

impl BackendConfig {
    pub fn is_offline(&self) -> bool {
        self.url.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Pause between finalize and handing control back, so the candidate
    /// sees the confirmation
    pub grace_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub escalate_suppressed_signals: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_delay_ms: 2000,
            tick_interval_ms: 1000,
            escalate_suppressed_signals: false,
        }
    }
}

impl SessionConfig {
    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn monitor(&self) -> ViolationMonitor {
        ViolationMonitor::new().with_escalated_suppression(self.escalate_suppressed_signals)
    }
}
