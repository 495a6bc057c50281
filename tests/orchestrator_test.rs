//! Tests for the sequential orchestrator.

use futures::FutureExt;
use strictly_blitz::{
    Category, GameHost, HarnessConfig, Orchestrator, Outcome, SUITE_ERROR, SimulatedHost, Suite,
    SuiteKind, Verdict,
};

fn setup_host() -> SimulatedHost {
    SimulatedHost::new(HarnessConfig::default())
}

/// Four checks: pass, fail, a streak mutation and a check that observes it.
fn progression_suite() -> Suite<SimulatedHost> {
    Suite::<SimulatedHost>::new("Progression", SuiteKind::Structured).category(
        Category::<SimulatedHost>::new("Streaks")
            .boolean("Always passes", |_h| async { Ok(true) }.boxed_local())
            .boolean("Always fails", |_h| async { Ok(false) }.boxed_local())
            .boolean("Sets streak", |h| {
                async move {
                    h.state_mut().streak = 5;
                    Ok(true)
                }
                .boxed_local()
            })
            .boolean("Sees streak", |h| async move { Ok(h.state().streak == 5) }.boxed_local()),
    )
}

#[tokio::test]
async fn test_mutations_are_visible_to_later_checks() {
    let mut host = setup_host();
    let report = Orchestrator::new(progression_suite()).run(&mut host).await;

    assert_eq!(*report.passed(), 3);
    assert_eq!(*report.failed(), 1);
    assert_eq!(report.results()[3].name, "Sees streak");
    assert_eq!(report.results()[3].outcome, Outcome::Pass);
    assert_eq!(report.errors()[0].test, "Always fails");
    assert_eq!(report.errors()[0].error, "Test returned false");
    assert_eq!(report.pass_rate(), 75.0);
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_panicking_check_fails_and_run_continues() {
    let suite = Suite::<SimulatedHost>::new("Resilience", SuiteKind::Structured).category(
        Category::<SimulatedHost>::new("Mixed")
            .boolean("Panics", |_h| {
                async {
                    if true {
                        panic!("board exploded");
                    }
                    Ok(true)
                }
                .boxed_local()
            })
            .verdict("Errors", |_h| {
                async { Err(anyhow::anyhow!("no puzzle loaded")) }.boxed_local()
            })
            .boolean("Still runs", |_h| async { Ok(true) }.boxed_local()),
    );

    let mut host = setup_host();
    let report = Orchestrator::new(suite).run(&mut host).await;

    assert_eq!(report.results().len(), 3);
    assert_eq!(report.results()[0].outcome, Outcome::Fail);
    assert_eq!(report.results()[0].message, "board exploded");
    assert_eq!(report.results()[1].message, "no puzzle loaded");
    assert_eq!(report.results()[2].outcome, Outcome::Pass);
    assert!(!*report.aborted());
}

#[tokio::test]
async fn test_setup_failure_aborts_run() {
    let suite = Suite::<SimulatedHost>::new("Broken", SuiteKind::AdHoc)
        .with_setup(|_h| async { Err(anyhow::anyhow!("board never rendered")) }.boxed_local())
        .category(
            Category::<SimulatedHost>::new("Never")
                .boolean("Not reached", |_h| async { Ok(true) }.boxed_local()),
        );

    let mut host = setup_host();
    let report = Orchestrator::new(suite).run(&mut host).await;

    assert!(*report.aborted());
    assert_eq!(report.results().len(), 1);
    assert_eq!(report.results()[0].name, SUITE_ERROR);
    assert_eq!(report.results()[0].category, "Broken");
    assert_eq!(report.results()[0].message, "board never rendered");
    assert_eq!(report.exit_code(), 1);

    let forwarded = host.diagnostics().errors().last().cloned().expect("forwarded");
    assert_eq!(forwarded.kind, "Unhandled Error");
    assert_eq!(forwarded.message, "board never rendered");
}

#[tokio::test]
async fn test_warnings_do_not_count_against_pass_rate() {
    let suite = Suite::<SimulatedHost>::new("Probes", SuiteKind::AdHoc).category(
        Category::<SimulatedHost>::new("Optional")
            .verdict("Present", |_h| async { Ok(Verdict::pass("found")) }.boxed_local())
            .verdict("Optional", |_h| {
                async { Ok(Verdict::warn("not installed")) }.boxed_local()
            }),
    );

    let mut host = setup_host();
    let report = Orchestrator::new(suite).run(&mut host).await;

    assert_eq!(*report.warned(), 1);
    assert_eq!(report.warnings()[0], "Optional: not installed");
    assert_eq!(report.pass_rate(), 100.0);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_empty_suite_reports_zero_rate() {
    let suite: Suite<SimulatedHost> = Suite::<SimulatedHost>::new("Empty", SuiteKind::Structured);
    let mut host = setup_host();
    let report = Orchestrator::new(suite).run(&mut host).await;

    assert!(report.results().is_empty());
    assert_eq!(report.pass_rate(), 0.0);
    assert_eq!(report.exit_code(), 0);
}
