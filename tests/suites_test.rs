//! Tests for the structured and ad-hoc suites against the simulated host.

use strictly_blitz::{
    ADHOC_SUITE, GameHost, HarnessConfig, LocalStorage, MemoryStorage, Orchestrator, Outcome,
    STRUCTURED_SUITE, SessionId, SessionSummary, SimulatedHost, SuiteKind, TestReport,
    adhoc_suite, structured_suite,
};

fn setup_host() -> SimulatedHost {
    SimulatedHost::new(HarnessConfig::default())
}

fn failures(report: &TestReport) -> Vec<String> {
    report
        .errors()
        .iter()
        .map(|entry| format!("{}: {}", entry.test, entry.error))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_structured_suite_passes_on_reference_host() {
    let mut host = setup_host();
    let report = Orchestrator::new(structured_suite()).run(&mut host).await;

    assert_eq!(report.suite(), STRUCTURED_SUITE);
    assert_eq!(*report.kind(), SuiteKind::Structured);
    assert!(!*report.aborted());
    assert!(failures(&report).is_empty(), "failures: {:?}", failures(&report));
    assert_eq!(*report.warned(), 0);
    assert_eq!(report.pass_rate(), 100.0);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_structured_suite_runs_categories_in_order() {
    let suite = structured_suite::<SimulatedHost>();
    let names: Vec<&str> = suite.categories().iter().map(|c| c.name()).collect();
    assert_eq!(names.first(), Some(&"Assessment Flow"));
    assert_eq!(names.last(), Some(&"Edge Cases"));
    assert_eq!(names.len(), 13);

    let expected = suite.len();
    let mut host = setup_host();
    let report = Orchestrator::new(suite).run(&mut host).await;
    assert_eq!(report.results().len(), expected);

    let mut seen: Vec<&str> = Vec::new();
    for result in report.results() {
        if seen.last() != Some(&result.category.as_str()) {
            seen.push(result.category.as_str());
        }
    }
    assert_eq!(seen.len(), 13);
}

#[tokio::test(start_paused = true)]
async fn test_structured_suite_leaves_host_usable() {
    let mut host = setup_host();
    let _ = Orchestrator::new(structured_suite()).run(&mut host).await;

    // Substituted collaborators are back in place.
    assert!(host.ai_engine().is_some());
    assert!(host.load_rated_puzzle());
    assert!(host.state().current_puzzle.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_oversized_write_refused_under_quota() {
    let storage = Box::new(MemoryStorage::with_quota(64 * 1024));
    let mut host = SimulatedHost::with_storage(HarnessConfig::default(), storage);
    let report = Orchestrator::new(structured_suite()).run(&mut host).await;

    let full = report
        .category_results("Error Handling")
        .find(|r| r.name == "LocalStorage full handled")
        .expect("LocalStorage full handled ran");
    assert_eq!(full.outcome, Outcome::Pass);
    let refused = host
        .diagnostics()
        .errors()
        .iter()
        .any(|e| e.kind == "localStorage quota exceeded");
    assert!(refused);
    assert!(
        host.diagnostics()
            .storage()
            .get_item("chessBlitzLargeData")
            .expect("get failed")
            .is_none()
    );
}

#[tokio::test(start_paused = true)]
async fn test_adhoc_suite_has_no_failures() {
    let mut host = setup_host();
    let report = Orchestrator::new(adhoc_suite()).run(&mut host).await;

    assert_eq!(report.suite(), ADHOC_SUITE);
    assert_eq!(*report.kind(), SuiteKind::AdHoc);
    assert!(failures(&report).is_empty(), "failures: {:?}", failures(&report));
    assert_eq!(report.exit_code(), 0);

    let squares = report
        .results()
        .iter()
        .find(|r| r.name == "Board Squares")
        .expect("Board Squares ran");
    assert_eq!(squares.outcome, Outcome::Pass);
    assert_eq!(squares.message, "Found 64 squares");
}

#[tokio::test(start_paused = true)]
async fn test_adhoc_suite_warns_without_ai() {
    let mut host = setup_host().without_ai();
    let report = Orchestrator::new(adhoc_suite()).run(&mut host).await;

    let ai = report
        .category_results("External Dependencies")
        .find(|r| r.name == "AI Engine")
        .expect("AI Engine ran");
    assert_eq!(ai.outcome, Outcome::Warn);
    assert!(*report.warned() >= 1);
    assert!(failures(&report).is_empty(), "failures: {:?}", failures(&report));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_report_export_and_session_summary() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut host = setup_host();
    let report = Orchestrator::new(adhoc_suite()).run(&mut host).await;

    let path = report.export(dir.path()).expect("Export failed");
    let content = std::fs::read_to_string(&path).expect("Read failed");
    let parsed: TestReport = serde_json::from_str(&content).expect("Parse failed");
    assert_eq!(parsed.results().len(), report.results().len());

    let session = SessionId::generate();
    let summary = SessionSummary::from_report(session.clone(), &report);
    let key = session.log_key("chessBlitz");
    assert!(host.diagnostics().safe_local_storage_set(&key, &summary));

    let evictable = host.diagnostics().settings().is_evictable(&key);
    assert!(evictable);
    let stored: Option<SessionSummary> = host.diagnostics().safe_local_storage_get(&key, None);
    assert_eq!(stored.expect("summary stored").passed, *report.passed());
}
