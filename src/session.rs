//! Session identifiers and session-scoped storage keys.

use crate::suite::{SuiteKind, TestReport};
use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

const SUFFIX_LEN: usize = 9;

/// Identifies one harness run, e.g. `2026-10-19T08-30-12_3f9a0c1de`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh identifier stamped with the current UTC second.
    #[instrument]
    pub fn generate() -> Self {
        Self::at(Utc::now())
    }

    /// A fresh identifier stamped with `when`.
    pub fn at(when: DateTime<Utc>) -> Self {
        let random = uuid::Uuid::new_v4().simple().to_string();
        let suffix: String = random.chars().take(SUFFIX_LEN).collect();
        let id = Self(format!("{}_{}", when.format("%Y-%m-%dT%H-%M-%S"), suffix));
        debug!(session_id = %id, "Generated session id");
        id
    }

    /// Storage key for this session's log under `namespace`. Such keys
    /// are evicted first when storage runs out of room.
    pub fn log_key(&self, namespace: &str) -> String {
        format!("{}_log_{}", namespace, self.0)
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What one run of the harness recorded under its session key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session the run belonged to.
    pub session_id: SessionId,
    /// Suite that ran.
    pub suite: String,
    /// Suite flavour.
    pub kind: SuiteKind,
    /// Passing checks.
    pub passed: usize,
    /// Failing checks.
    pub failed: usize,
    /// Warning checks.
    pub warned: usize,
    /// When the run finished.
    pub recorded_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Summarises `report` for `session_id`.
    pub fn from_report(session_id: SessionId, report: &TestReport) -> Self {
        Self::new(
            session_id,
            report.suite().clone(),
            *report.kind(),
            *report.passed(),
            *report.failed(),
            *report.warned(),
            Utc::now(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_id_format() {
        let when = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 12).single().expect("valid time");
        let id = SessionId::at(when);
        let (stamp, suffix) = id.as_str().split_once('_').expect("separator");
        assert_eq!(stamp, "2026-10-19T08-30-12");
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_log_key_is_namespaced() {
        let id = SessionId::generate();
        let key = id.log_key("chessBlitz");
        assert!(key.starts_with("chessBlitz_log_"));
        assert!(key.ends_with(id.as_str()));
    }

    #[test]
    fn test_distinct_ids() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }
}
