//! Check outcomes and per-check results.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter};

/// Three-valued check outcome. `Warn` never counts as a failure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    /// The check held.
    Pass,
    /// The check did not hold or raised.
    Fail,
    /// Worth a look, not a failure.
    Warn,
}

impl Outcome {
    /// Status symbol used in rendered reports.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Pass => "✅",
            Self::Fail => "❌",
            Self::Warn => "⚠️",
        }
    }
}

/// What a check body concluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Outcome.
    pub outcome: Outcome,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Verdict {
    /// A passing verdict.
    pub fn pass(message: impl Into<String>) -> Self {
        Self::with(Outcome::Pass, message)
    }

    /// A failing verdict.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::with(Outcome::Fail, message)
    }

    /// A warning verdict.
    pub fn warn(message: impl Into<String>) -> Self {
        Self::with(Outcome::Warn, message)
    }

    fn with(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured detail.
    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<bool> for Verdict {
    fn from(held: bool) -> Self {
        if held {
            Self::pass("Passed")
        } else {
            Self::fail("Test returned false")
        }
    }
}

/// Result of one executed check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Check name.
    pub name: String,
    /// Category the check belongs to.
    pub category: String,
    /// Outcome.
    pub outcome: Outcome,
    /// Verdict or failure message.
    pub message: String,
    /// Optional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Wall time spent in the check.
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_false_is_a_generic_failure() {
        let verdict = Verdict::from(false);
        assert_eq!(verdict.outcome, Outcome::Fail);
        assert_eq!(verdict.message, "Test returned false");
        assert_eq!(Verdict::from(true).outcome, Outcome::Pass);
    }

    #[test]
    fn test_outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Outcome::Warn).ok().as_deref(), Some("\"warn\""));
        assert_eq!(Outcome::Fail.to_string(), "fail");
    }
}
