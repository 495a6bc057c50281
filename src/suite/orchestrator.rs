//! Sequential suite runner.
//!
//! Checks run one at a time in declaration order against a single host, so
//! every mutation a check makes is visible to the checks after it. A check
//! that errors or panics becomes a Fail and the run continues. Only a setup
//! failure ends the run early.

use super::check::Suite;
use super::outcome::{Outcome, TestResult};
use super::report::TestReport;
use crate::games::chessblitz::GameHost;
use crate::unwind::catch_failure;
use crate::validation::ErrorSink;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Name of the synthetic result recorded when setup fails.
pub const SUITE_ERROR: &str = "Test Suite Error";

/// Runs one suite against a host.
#[derive(Debug)]
pub struct Orchestrator<H> {
    suite: Suite<H>,
}

impl<H: GameHost + 'static> Orchestrator<H> {
    /// Creates an orchestrator for `suite`.
    pub fn new(suite: Suite<H>) -> Self {
        Self { suite }
    }

    /// The suite being run.
    pub fn suite(&self) -> &Suite<H> {
        &self.suite
    }

    /// Runs setup and then every check, returning the report.
    #[instrument(skip(self, host), fields(suite = %self.suite.name(), checks = self.suite.len()))]
    pub async fn run(self, host: &mut H) -> TestReport {
        let started = Instant::now();
        let mut report = TestReport::begin(self.suite.name(), self.suite.kind());
        info!("Starting test suite");

        if let Some(setup) = self.suite.setup() {
            if let Err(message) = catch_failure(setup(host)).await {
                error!(%message, "Suite setup failed");
                host.diagnostics().forward_uncaught("suite setup", &message);
                report.record(TestResult {
                    name: SUITE_ERROR.to_string(),
                    category: self.suite.name().to_string(),
                    outcome: Outcome::Fail,
                    message,
                    details: None,
                    duration_ms: elapsed_ms(started),
                });
                report.mark_aborted();
                report.finish(elapsed_ms(started));
                return report;
            }
        }

        for category in self.suite.categories() {
            info!(category = %category.name(), "Running category");
            for check in category.checks() {
                let check_started = Instant::now();
                let result = match catch_failure(check.run(host)).await {
                    Ok(verdict) => TestResult {
                        name: check.name().to_string(),
                        category: category.name().to_string(),
                        outcome: verdict.outcome,
                        message: verdict.message,
                        details: verdict.details,
                        duration_ms: elapsed_ms(check_started),
                    },
                    Err(message) => TestResult {
                        name: check.name().to_string(),
                        category: category.name().to_string(),
                        outcome: Outcome::Fail,
                        message,
                        details: None,
                        duration_ms: elapsed_ms(check_started),
                    },
                };
                log_result(&result);
                report.record(result);
            }
        }

        report.finish(elapsed_ms(started));
        info!(
            passed = report.passed(),
            failed = report.failed(),
            warned = report.warned(),
            pass_rate = report.pass_rate(),
            "Suite finished"
        );
        report
    }
}

fn log_result(result: &TestResult) {
    match result.outcome {
        Outcome::Pass => info!(
            check = %result.name,
            category = %result.category,
            "{} {}",
            result.outcome.symbol(),
            result.message
        ),
        Outcome::Warn | Outcome::Fail => warn!(
            check = %result.name,
            category = %result.category,
            outcome = %result.outcome,
            "{} {}",
            result.outcome.symbol(),
            result.message
        ),
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
