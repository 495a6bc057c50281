//! Error and warning records, the critical classifier and sink traits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display};

/// One logged error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Error category, for example `Error in loadNextPuzzle`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Arbitrary structured context.
    #[serde(default)]
    pub details: Value,
    /// When the error was logged.
    pub timestamp: DateTime<Utc>,
    /// Location context of the running harness.
    pub url: String,
}

/// One logged warning. Warnings live only in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningRecord {
    /// Human-readable message.
    pub message: String,
    /// Arbitrary structured context.
    #[serde(default)]
    pub details: Value,
    /// When the warning was logged.
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of everything the engine has logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// All errors, oldest first.
    pub errors: Vec<ErrorRecord>,
    /// All warnings, oldest first.
    pub warnings: Vec<WarningRecord>,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Most recent error.
    pub last_error: Option<ErrorRecord>,
    /// Errors the classifier marks critical.
    pub critical_errors: Vec<ErrorRecord>,
}

/// Marks errors whose type or message mentions a configured keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalClassifier {
    keywords: Vec<String>,
}

impl CriticalClassifier {
    /// Creates a classifier over `keywords`.
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    /// Keywords in use.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns true when `record` is critical.
    pub fn is_critical(&self, record: &ErrorRecord) -> bool {
        self.keywords
            .iter()
            .any(|k| record.message.contains(k.as_str()) || record.kind.contains(k.as_str()))
    }
}

/// Severity passed to a [`FeedbackSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FeedbackKind {
    /// Positive confirmation.
    Success,
    /// Neutral notice.
    Info,
    /// Something went wrong.
    Error,
}

/// User-visible notification channel, the host's `showFeedback`.
pub trait FeedbackSink {
    /// Shows `message` to the user.
    fn show_feedback(&self, message: &str, kind: FeedbackKind);
}

/// Destination for failures that escaped their own handling.
///
/// Each concurrency domain installs one boundary that forwards uncaught
/// failures here instead of letting them reach the host.
pub trait ErrorSink {
    /// Records an error.
    fn record_error(&mut self, kind: &str, message: &str, details: Value);

    /// Records a warning.
    fn record_warning(&mut self, message: &str, details: Value);

    /// Records a failure that escaped a task or callback.
    fn forward_uncaught(&mut self, origin: &str, message: &str) {
        self.record_error(
            "Unhandled Error",
            message,
            serde_json::json!({ "origin": origin }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(kind: &str, message: &str) -> ErrorRecord {
        ErrorRecord {
            kind: kind.to_string(),
            message: message.to_string(),
            details: json!({}),
            timestamp: Utc::now(),
            url: "app://test".to_string(),
        }
    }

    #[test]
    fn test_classifier_checks_type_and_message() {
        let classifier = CriticalClassifier::new(vec!["Network".to_string(), "localStorage".to_string()]);
        assert!(classifier.is_critical(&record("Network Error", "timeout")));
        assert!(classifier.is_critical(&record("Error", "localStorage quota exceeded")));
        assert!(!classifier.is_critical(&record("Error in renderBoard", "boom")));
    }

    #[test]
    fn test_record_serializes_type_field() {
        let json = serde_json::to_value(record("Console Error", "x")).expect("serialize failed");
        assert_eq!(json["type"], "Console Error");
        assert!(json.get("kind").is_none());
    }
}
