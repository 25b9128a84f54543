//! Exam policy read once at session start.

use crate::error::{ProctorError, Result};
use serde::{Deserialize, Serialize};

/// Immutable session policy supplied by the settings collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPolicy {
    pub total_time_minutes: u32,
    /// Escalation threshold: this many violations force finalize
    pub max_violations: u32,
    pub is_calculator_enabled: bool,
    pub is_review_enabled: bool,
}

impl Default for ExamPolicy {
    fn default() -> Self {
        Self {
            total_time_minutes: 40,
            max_violations: 3,
            is_calculator_enabled: true,
            is_review_enabled: true,
        }
    }
}

impl ExamPolicy {
    pub fn total_seconds(&self) -> u32 {
        self.total_time_minutes.saturating_mul(60)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_time_minutes == 0 {
            return Err(ProctorError::config("total_time_minutes must be at least 1"));
        }
        if self.max_violations == 0 {
            return Err(ProctorError::config("max_violations must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_institutional_settings() {
        let policy = ExamPolicy::default();
        assert_eq!(policy.total_seconds(), 2400);
        assert_eq!(policy.max_violations, 3);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let policy = ExamPolicy {
            total_time_minutes: 0,
            ..ExamPolicy::default()
        };
        assert!(policy.validate().unwrap_err().is_config());

        let policy = ExamPolicy {
            max_violations: 0,
            ..ExamPolicy::default()
        };
        assert!(policy.validate().unwrap_err().is_config());
    }
}
