//! Aggregated suite results, text rendering and JSON export.

use super::check::SuiteKind;
use super::outcome::{Outcome, TestResult};
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// A failed check and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct FailureEntry {
    /// Check name.
    pub test: String,
    /// Failure message.
    pub error: String,
}

/// Everything a suite run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    /// Suite name.
    suite: String,
    /// Suite flavour.
    kind: SuiteKind,
    /// Per-check results in run order.
    results: Vec<TestResult>,
    /// Passing checks.
    passed: usize,
    /// Failing checks.
    failed: usize,
    /// Warning checks.
    warned: usize,
    /// Failures with their messages.
    errors: Vec<FailureEntry>,
    /// Warning messages.
    warnings: Vec<String>,
    /// Wall time of the whole run.
    duration_ms: u64,
    /// When the run started.
    started_at: DateTime<Utc>,
    /// Whether setup failed and no check ran.
    aborted: bool,
}

impl TestReport {
    /// An empty report for a run starting now.
    pub fn begin(suite: impl Into<String>, kind: SuiteKind) -> Self {
        Self {
            suite: suite.into(),
            kind,
            results: Vec::new(),
            passed: 0,
            failed: 0,
            warned: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
            duration_ms: 0,
            started_at: Utc::now(),
            aborted: false,
        }
    }

    /// Records one result and updates the tallies.
    pub fn record(&mut self, result: TestResult) {
        match result.outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => {
                self.failed += 1;
                self.errors
                    .push(FailureEntry::new(result.name.clone(), result.message.clone()));
            }
            Outcome::Warn => {
                self.warned += 1;
                self.warnings
                    .push(format!("{}: {}", result.name, result.message));
            }
        }
        self.results.push(result);
    }

    /// Marks the run as aborted by a setup failure.
    pub fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    /// Stamps the total duration.
    pub fn finish(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Passed share of pass plus fail, as a percentage. Warnings are left
    /// out; an empty run rates 0.
    pub fn pass_rate(&self) -> f64 {
        let total = self.passed + self.failed;
        if total == 0 {
            0.0
        } else {
            self.passed as f64 / total as f64 * 100.0
        }
    }

    /// Process exit code: 0 when nothing failed.
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 && !self.aborted { 0 } else { 1 }
    }

    /// Results of one category, in run order.
    pub fn category_results<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a TestResult> {
        self.results.iter().filter(move |r| r.category == category)
    }

    /// Human-readable summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Test results: {} ({})", self.suite, self.kind);
        let mut category = "";
        for result in &self.results {
            if result.category != category {
                category = result.category.as_str();
                let _ = writeln!(out, "\n{}", category);
            }
            let _ = writeln!(
                out,
                "  {} {}: {}",
                result.outcome.symbol(),
                result.name,
                result.message
            );
        }

        let _ = writeln!(out, "\nTotal: {}", self.results.len());
        let _ = writeln!(out, "Passed: {}", self.passed);
        let _ = writeln!(out, "Failed: {}", self.failed);
        if self.kind == SuiteKind::AdHoc || self.warned > 0 {
            let _ = writeln!(out, "Warnings: {}", self.warned);
        }
        let _ = writeln!(out, "Pass rate: {:.1}%", self.pass_rate());
        let _ = writeln!(out, "Duration: {:.2}s", self.duration_ms as f64 / 1000.0);

        if !self.errors.is_empty() {
            let _ = writeln!(out, "\nErrors:");
            for (i, entry) in self.errors.iter().enumerate() {
                let _ = writeln!(out, "{}. {}: {}", i + 1, entry.test, entry.error);
            }
        }
        if !self.warnings.is_empty() {
            let _ = writeln!(out, "\nWarnings:");
            for warning in &self.warnings {
                let _ = writeln!(out, "- {}", warning);
            }
        }
        out
    }

    /// Pretty JSON document of the whole report.
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the report to `strictly-blitz-<suite>-<unix millis>.json` in
    /// `dir` and returns the path.
    #[instrument(skip(self, dir), fields(suite = %self.suite))]
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        let slug: String = self
            .suite
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        let path = dir.as_ref().join(format!(
            "strictly-blitz-{}-{}.json",
            slug,
            Utc::now().timestamp_millis()
        ));
        std::fs::write(&path, self.to_json()?)?;
        info!(path = %path.display(), "Test report exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: Outcome) -> TestResult {
        TestResult {
            name: name.to_string(),
            category: "Timer".to_string(),
            outcome,
            message: format!("{} happened", name),
            details: None,
            duration_ms: 1,
        }
    }

    #[test]
    fn test_empty_report_rates_zero() {
        let report = TestReport::begin("empty", SuiteKind::Structured);
        assert_eq!(report.pass_rate(), 0.0);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_warnings_do_not_count_toward_rate() {
        let mut report = TestReport::begin("mixed", SuiteKind::AdHoc);
        report.record(result("a", Outcome::Pass));
        report.record(result("b", Outcome::Pass));
        report.record(result("c", Outcome::Pass));
        report.record(result("d", Outcome::Fail));
        report.record(result("e", Outcome::Warn));
        assert_eq!(report.pass_rate(), 75.0);
        assert_eq!(report.errors().len(), 1);
        assert_eq!(report.warnings().len(), 1);
        assert_eq!(report.exit_code(), 1);

        let text = report.render();
        assert!(text.contains("Pass rate: 75.0%"));
        assert!(text.contains("1. d: d happened"));
    }

    #[test]
    fn test_export_writes_timestamped_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut report = TestReport::begin("Structured Suite", SuiteKind::Structured);
        report.record(result("a", Outcome::Pass));
        let path = report.export(dir.path()).expect("export");
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.starts_with("strictly-blitz-structured-suite-"));
        let parsed: TestReport =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(parsed.passed(), &1);
    }
}
