//! Command-line interface for strictly_blitz.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Blitz - validation and test harness for the chess puzzle arena
#[derive(Parser, Debug)]
#[command(name = "strictly_blitz")]
#[command(about = "Validate game data and run the arena test suites", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Harness configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON file backing persistent storage. In-memory when omitted.
    #[arg(short, long, global = true)]
    pub storage: Option<PathBuf>,

    /// Enable debug logging and console echo of logged errors
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a game state, puzzle or move
    Validate {
        /// What to validate
        #[command(subcommand)]
        target: ValidateTarget,
    },

    /// Run a test suite against the simulated host
    Suite {
        /// Which suite to run
        #[arg(value_enum)]
        kind: SuiteChoice,

        /// Directory to export the JSON report into
        #[arg(long)]
        export: Option<PathBuf>,

        /// Run without an AI engine installed
        #[arg(long)]
        no_ai: bool,
    },

    /// Print the error report kept in storage
    Report {
        /// Directory to export the JSON error report into
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

/// Validation targets
#[derive(Subcommand, Debug)]
pub enum ValidateTarget {
    /// A game state JSON file
    State {
        /// Path to the JSON document
        file: PathBuf,
    },

    /// A puzzle JSON file
    Puzzle {
        /// Path to the JSON document
        file: PathBuf,
    },

    /// A move in coordinate notation, e.g. e2e4
    Move {
        /// The move text
        #[arg(name = "MOVE")]
        mv: String,
    },
}

/// Suite selection
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteChoice {
    /// Categorised behaviour checks
    Structured,
    /// Presence probes with warnings
    Adhoc,
}
