//! The chess puzzle arena: rules, puzzles and the host surface the
//! harness drives.

mod ai;
mod board;
mod deck;
mod host;
pub mod notation;
mod simulated;
mod types;

pub use ai::{AiEngine, Analysis, BookEngine};
pub use board::{Board, Piece, PieceKind, START_FEN};
pub use deck::PuzzleDeck;
pub use host::{
    BoardView, ElementProbe, GameHost, HostError, HostSurface, HudSnapshot, MoveOutcome,
    SquareView, TimerDisplay, globals, ids, selectors,
};
pub use notation::{NotationError, Promotion, Square, UciMove};
pub use simulated::{FeedbackLog, SimulatedHost, start_position_puzzle};
pub use types::{GameState, PowerKind, Powers, Puzzle, RatingTier, Side};
