//! The collaborator surface a game host exposes to the harness.
//!
//! Hosts return plain view values where a browser page would expose DOM
//! nodes, so the suites can run against any implementation.

use super::ai::AiEngine;
use super::deck::PuzzleDeck;
use super::notation::Square;
use super::types::{GameState, PowerKind, RatingTier, Side};
use crate::harness_config::HarnessConfig;
use crate::validation::ValidationEngine;
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::time::Duration;

/// Element ids probed by the suites.
pub mod ids {
    /// Board container.
    pub const CHESS_BOARD: &str = "chess-board";
    /// Assessment start button.
    pub const START_ASSESSMENT: &str = "start-assessment";
    /// Hint power-up button.
    pub const POWER_HINT: &str = "power-hint";
    /// Hint counter label.
    pub const HINT_COUNT: &str = "hint-count";
    /// Freeze power-up button.
    pub const POWER_FREEZE: &str = "power-freeze";
    /// Timer label.
    pub const TIMER: &str = "timer";
    /// Instruction line.
    pub const PUZZLE_INSTRUCTION: &str = "puzzle-instruction";
    /// Level badge.
    pub const LEVEL_BADGE: &str = "level-badge";
    /// Streak counter.
    pub const STREAK_COUNT: &str = "streak-count";
}

/// Selectors counted by the suites.
pub mod selectors {
    /// Every board square.
    pub const SQUARE: &str = ".square";
    /// Squares holding a White piece.
    pub const WHITE_PIECE: &str = ".square.white-piece";
    /// Squares holding a Black piece.
    pub const BLACK_PIECE: &str = ".square.black-piece";
    /// Squares highlighted as move targets.
    pub const LEGAL_MOVE: &str = ".square.legal-move";
    /// Squares with a click handler attached.
    pub const CLICKABLE: &str = ".square.clickable";
    /// Assessment progress dots.
    pub const PROGRESS_DOT: &str = ".progress-dot";
    /// Visible modal overlays.
    pub const MODAL_OVERLAY: &str = ".modal-overlay";
}

/// Global symbols probed by the suites.
pub mod globals {
    /// The game state object.
    pub const GAME_STATE: &str = "gameState";
    /// The validation engine.
    pub const ERROR_HANDLER: &str = "chessErrorHandler";
    /// The developer console.
    pub const DEBUG_CONSOLE: &str = "chessDebug";
    /// The move-generation library.
    pub const CHESS_LIBRARY: &str = "Chess";
    /// The AI engine.
    pub const AI_ENGINE: &str = "aiEngine";
}

/// Failure raised by a host collaborator.
#[derive(Debug, Clone, Display, Error)]
#[display("Host error: {} at {}:{}", message, file, line)]
pub struct HostError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl HostError {
    /// Creates a new host error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// What happened to a submitted move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move matched the solution.
    Correct,
    /// A well-formed move that is not the solution.
    Wrong,
    /// The move failed validation; nothing changed.
    Rejected(Vec<String>),
    /// No puzzle was loaded.
    NoPuzzle,
}

/// Rendered timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDisplay {
    /// Seconds left.
    pub seconds: i64,
    /// Text as shown, `m:ss`.
    pub text: String,
    /// Whether the warning style is on.
    pub warning: bool,
}

/// Rendered heads-up display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HudSnapshot {
    /// Level badge text, e.g. `LVL 42`.
    pub level_badge: String,
    /// Streak counter text.
    pub streak_count: String,
    /// Rating text.
    pub rating: String,
    /// Coin balance text.
    pub coins: String,
}

/// One rendered square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareView {
    /// Board square.
    pub square: Square,
    /// FEN letter of the occupant.
    pub piece: Option<char>,
    /// Owner of the occupant.
    pub piece_side: Option<Side>,
    /// Whether the square is selected.
    pub selected: bool,
    /// Whether the square is highlighted as a move target.
    pub legal_target: bool,
}

/// The rendered board, squares in display order (top-left first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// Side shown at the bottom.
    pub orientation: Side,
    /// 64 squares.
    pub squares: Vec<SquareView>,
}

impl BoardView {
    /// Squares holding a piece of `side`.
    pub fn piece_count(&self, side: Side) -> usize {
        self.squares.iter().filter(|s| s.piece_side == Some(side)).count()
    }

    /// Highlighted move targets.
    pub fn legal_target_count(&self) -> usize {
        self.squares.iter().filter(|s| s.legal_target).count()
    }

    /// Bottom-right square as displayed.
    pub fn bottom_right(&self) -> Option<&SquareView> {
        self.squares.last()
    }
}

/// Result of probing one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementProbe {
    /// Element id.
    pub id: String,
    /// Text content.
    pub text: String,
    /// Whether it is displayed.
    pub visible: bool,
    /// Whether it accepts input.
    pub enabled: bool,
    /// Style classes.
    pub classes: Vec<String>,
}

impl ElementProbe {
    /// Returns true when `class` is applied.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Presence probes used by the ad-hoc suite.
pub trait HostSurface {
    /// Looks up an element by id.
    fn element(&self, id: &str) -> Option<ElementProbe>;

    /// Counts elements matching `selector`.
    fn count(&self, selector: &str) -> usize;

    /// Returns true when the global `name` is defined.
    fn has_global(&self, name: &str) -> bool;
}

/// The game collaborators the harness drives.
///
/// Timed effects such as the turn timer and puzzle auto-advance only move
/// when [`GameHost::advance`] reports elapsed time.
#[async_trait(?Send)]
pub trait GameHost: HostSurface {
    /// Harness configuration the host was built with.
    fn config(&self) -> &HarnessConfig;

    /// Current game state.
    fn state(&self) -> &GameState;

    /// Mutable game state. Writes are seen by every later caller.
    fn state_mut(&mut self) -> &mut GameState;

    /// The validation engine guarding this host.
    fn diagnostics(&mut self) -> &mut ValidationEngine;

    /// Submits a move played onto square (`row`, `col`).
    fn check_move(&mut self, mv: &str, row: u8, col: u8) -> MoveOutcome;

    /// Spends one power-up. Returns false when none are left.
    fn use_power(&mut self, kind: PowerKind) -> bool;

    /// Loads the next puzzle in play order.
    fn load_next_puzzle(&mut self);

    /// Loads the puzzle for the current assessment step.
    fn load_assessment_puzzle(&mut self);

    /// Starts the placement assessment.
    fn start_assessment(&mut self);

    /// Ends the assessment and applies its rating, which is returned.
    fn complete_assessment(&mut self) -> i64;

    /// Rating the recorded assessment results earn.
    fn calculate_assessment_rating(&self) -> i64;

    /// Adds XP, levelling up as thresholds are crossed.
    fn add_xp(&mut self, amount: i64);

    /// Applies the effects of a correct answer.
    fn handle_correct_answer(&mut self);

    /// Applies the effects of a wrong answer.
    fn handle_wrong_answer(&mut self);

    /// Rating a correct answer on the current puzzle would earn.
    fn calculate_rating_gain(&self) -> i64;

    /// Band of the current rating.
    fn rating_tier(&self) -> RatingTier;

    /// Restarts the turn timer.
    fn start_timer(&mut self);

    /// Renders and returns the timer.
    fn update_timer_display(&mut self) -> TimerDisplay;

    /// Renders and returns the board.
    fn render_board(&mut self) -> BoardView;

    /// Renders and returns the heads-up display.
    fn update_all_displays(&mut self) -> HudSnapshot;

    /// Persists the game state. Returns whether it was written.
    fn save_game_state(&mut self) -> bool;

    /// Restores the persisted game state. Returns whether one was found.
    fn load_game_state(&mut self) -> bool;

    /// Builds the move-generation board for the current puzzle. Returns
    /// false, after logging, when the position cannot be loaded.
    fn initialize_chess_instance(&mut self) -> bool;

    /// Tries `mv` on a copy of the move-generation board.
    fn probe_move(&self, mv: &str) -> bool;

    /// Move targets of the piece on (`row`, `col`).
    fn legal_moves(&self, row: u8, col: u8) -> Vec<Square>;

    /// Handles a click on (`row`, `col`).
    fn handle_square_click(&mut self, row: u8, col: u8);

    /// Highlights the targets of the piece on (`row`, `col`).
    fn handle_square_hover(&mut self, row: u8, col: u8) -> Vec<Square>;

    /// Shows a hint for the current puzzle and returns its text.
    async fn show_hint(&mut self) -> String;

    /// The installed AI engine.
    fn ai_engine(&self) -> Option<Rc<dyn AiEngine>>;

    /// Installs `engine`, returning the previous one.
    fn replace_ai_engine(&mut self, engine: Option<Rc<dyn AiEngine>>) -> Option<Rc<dyn AiEngine>>;

    /// Installs `deck`, returning the previous one.
    fn replace_puzzle_deck(&mut self, deck: PuzzleDeck) -> PuzzleDeck;

    /// Loads the puzzle rated closest to the player. Returns false when
    /// the deck has none.
    fn load_rated_puzzle(&mut self) -> bool;

    /// Number of puzzles loaded so far.
    fn puzzles_loaded(&self) -> u64;

    /// Lets timed effects catch up with `elapsed` wall time.
    fn advance(&mut self, elapsed: Duration);
}
