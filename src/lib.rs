//! Strictly Blitz library - validation and test orchestration for a chess
//! puzzle arena
//!
//! # Architecture
//!
//! - **Validation**: rule tables for game states, puzzles and moves, plus
//!   guarded mutation, guarded persistence and a bounded error log
//! - **Storage**: the key/value store the game persists into
//! - **Games**: the arena's data model and the host surface the harness
//!   drives, with an in-process reference host
//! - **Suite**: structured and ad-hoc check suites run by a sequential
//!   orchestrator
//!
//! # Example
//!
//! ```no_run
//! use strictly_blitz::{HarnessConfig, Orchestrator, SimulatedHost, structured_suite};
//!
//! # async fn example() {
//! let mut host = SimulatedHost::new(HarnessConfig::default());
//! let report = Orchestrator::new(structured_suite()).run(&mut host).await;
//! println!("{}", report.render());
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod games;
mod harness_config;
mod session;
mod storage;
mod suite;
mod unwind;
mod validation;

// Crate-level exports - Configuration
pub use harness_config::{
    AssessmentSettings, ConfigError, DEBUG_ENV_VAR, GameSettings, HarnessConfig, StorageSettings,
    TimingSettings,
};

// Crate-level exports - Storage
pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError, StorageErrorKind};

// Crate-level exports - Validation
pub use validation::{
    Constraint, CriticalClassifier, ErrorRecord, ErrorReport, ErrorSink, FeedbackKind,
    FeedbackSink, FieldPath, FieldRule, FieldValue, MoveRule, PathError, REQUIRED_PUZZLE_FIELDS,
    REQUIRED_STATE_FIELDS, RuleNamespace, ValidationEngine, ValidationRules, WarningRecord,
    display_value,
};

// Crate-level exports - Game types
pub use games::chessblitz::{
    AiEngine, Analysis, Board, BoardView, BookEngine, ElementProbe, FeedbackLog, GameHost,
    GameState, HostError, HostSurface, HudSnapshot, MoveOutcome, NotationError, Piece, PieceKind,
    PowerKind, Powers, Promotion, Puzzle, PuzzleDeck, RatingTier, START_FEN, Side, SimulatedHost,
    Square, SquareView, TimerDisplay, UciMove, globals, ids, notation, selectors,
    start_position_puzzle,
};

// Crate-level exports - Test orchestration
pub use suite::{
    ADHOC_SUITE, Category, Check, CheckFn, CheckFuture, FailureEntry, Orchestrator, Outcome,
    STRUCTURED_SUITE, SUITE_ERROR, SetupFn, Suite, SuiteKind, TestReport, TestResult, Verdict,
    adhoc_suite, settle, structured_suite, wait_until, with_substitute,
};

// Crate-level exports - Sessions
pub use session::{SessionId, SessionSummary};

// Crate-level exports - Failure capture
pub use unwind::{catch_failure, panic_message};
