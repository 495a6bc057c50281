//! Strictly Blitz - command-line harness
//!
//! Validates game data and runs the arena test suites against the
//! simulated host.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, SuiteChoice, ValidateTarget};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use strictly_blitz::{
    FileStorage, GameHost, HarnessConfig, LocalStorage, MemoryStorage, Orchestrator, SessionId,
    SessionSummary, SimulatedHost, TestReport, ValidationEngine, adhoc_suite, structured_suite,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = load_config(cli.config.as_deref(), cli.debug)?;
    let storage = open_storage(cli.storage.as_deref(), &config)?;

    match cli.command {
        Command::Validate { target } => run_validate(&config, storage, target),
        Command::Suite {
            kind,
            export,
            no_ai,
        } => run_suite(config, storage, kind, export, no_ai).await,
        Command::Report { export } => run_report(&config, storage, export),
    }
}

fn init_tracing(debug: bool) {
    let fallback = if debug {
        "info,strictly_blitz=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

#[instrument(skip(debug))]
fn load_config(path: Option<&Path>, debug: bool) -> Result<HarnessConfig> {
    let config = match path {
        Some(path) => HarnessConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    let config = config.apply_env();
    Ok(if debug { config.with_debug(true) } else { config })
}

#[instrument(skip(config))]
fn open_storage(path: Option<&Path>, config: &HarnessConfig) -> Result<Box<dyn LocalStorage>> {
    let quota = *config.storage().quota_bytes();
    Ok(match (path, quota) {
        (Some(path), quota) => Box::new(
            FileStorage::open(path, quota)
                .with_context(|| format!("opening storage at {}", path.display()))?,
        ),
        (None, Some(quota)) => Box::new(MemoryStorage::with_quota(quota)),
        (None, None) => Box::new(MemoryStorage::new()),
    })
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Validate a state, puzzle or move and print every problem found.
#[instrument(skip(config, storage))]
fn run_validate(
    config: &HarnessConfig,
    storage: Box<dyn LocalStorage>,
    target: ValidateTarget,
) -> Result<ExitCode> {
    let mut engine = ValidationEngine::new(config, storage);
    let errors = match &target {
        ValidateTarget::State { file } => engine.validate_game_state(Some(&read_json(file)?)),
        ValidateTarget::Puzzle { file } => engine.validate_puzzle(Some(&read_json(file)?)),
        ValidateTarget::Move { mv } => engine.validate_move(Some(mv.as_str())),
    };

    if errors.is_empty() {
        println!("✅ valid");
        return Ok(ExitCode::SUCCESS);
    }
    for error in &errors {
        println!("❌ {}", error);
    }
    for warning in engine.warnings() {
        println!("⚠️ {}", warning.message);
    }
    Ok(ExitCode::FAILURE)
}

/// Run a suite against the simulated host and record it under a session key.
#[instrument(skip(config, storage))]
async fn run_suite(
    config: HarnessConfig,
    storage: Box<dyn LocalStorage>,
    kind: SuiteChoice,
    export: Option<PathBuf>,
    no_ai: bool,
) -> Result<ExitCode> {
    let session = SessionId::generate();
    info!(session_id = %session, ?kind, "Starting suite run");

    let namespace = config.storage().namespace().clone();
    let mut host = SimulatedHost::with_storage(config, storage);
    if no_ai {
        host = host.without_ai();
    }

    let report = match kind {
        SuiteChoice::Structured => Orchestrator::new(structured_suite()).run(&mut host).await,
        SuiteChoice::Adhoc => Orchestrator::new(adhoc_suite()).run(&mut host).await,
    };
    println!("{}", report.render());

    let summary = SessionSummary::from_report(session.clone(), &report);
    if !host
        .diagnostics()
        .safe_local_storage_set(&session.log_key(&namespace), &summary)
    {
        warn!(session_id = %session, "Session summary not persisted");
    }

    if let Some(dir) = export {
        let path = report.export(&dir)?;
        println!("Report written to {}", path.display());
    }
    Ok(exit_code(&report))
}

fn exit_code(report: &TestReport) -> ExitCode {
    u8::try_from(report.exit_code())
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}

/// Print the error report held in storage.
#[instrument(skip(config, storage))]
fn run_report(
    config: &HarnessConfig,
    storage: Box<dyn LocalStorage>,
    export: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut engine = ValidationEngine::new(config, storage);
    let restored = engine.restore_persisted_errors();
    info!(restored, "Loaded persisted errors");

    let report = engine.error_report();
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(dir) = export {
        let path = engine.export_errors(&dir)?;
        println!("Error report written to {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
