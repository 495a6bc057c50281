//! Test orchestration: checks, suites, the sequential runner and reports.

mod adhoc;
mod check;
mod orchestrator;
mod outcome;
mod report;
mod structured;
mod support;

pub use adhoc::{ADHOC_SUITE, adhoc_suite};
pub use check::{Category, Check, CheckFn, CheckFuture, SetupFn, Suite, SuiteKind};
pub use orchestrator::{Orchestrator, SUITE_ERROR};
pub use outcome::{Outcome, TestResult, Verdict};
pub use report::{FailureEntry, TestReport};
pub use structured::{STRUCTURED_SUITE, structured_suite};
pub use support::{settle, wait_until, with_substitute};
