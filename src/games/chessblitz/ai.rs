//! AI engine seam and a book-backed reference engine.

use super::board::START_FEN;
use super::deck::PuzzleDeck;
use super::host::HostError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Engine verdict on a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Recommended move in coordinate notation.
    pub best_move: String,
    /// Evaluation in pawns from the mover's side.
    pub evaluation: f64,
}

/// Position analysis service.
#[async_trait(?Send)]
pub trait AiEngine: std::fmt::Debug {
    /// Whether the engine can answer.
    async fn is_ready(&self) -> bool;

    /// Best move for the position `fen`.
    async fn analyze_position(&self, fen: &str) -> Result<Analysis, HostError>;
}

/// Answers from a table of known positions. Performs no search.
#[derive(Debug, Clone, Default)]
pub struct BookEngine {
    book: HashMap<String, String>,
}

/// Placement and side to move, which is all the book keys on.
fn book_key(fen: &str) -> String {
    fen.split(' ').take(2).collect::<Vec<_>>().join(" ")
}

impl BookEngine {
    /// Book covering every puzzle in `deck` plus the opening position.
    #[instrument(skip(deck))]
    pub fn from_deck(deck: &PuzzleDeck) -> Self {
        let mut book = HashMap::new();
        book.insert(book_key(START_FEN), "e2e4".to_string());
        for puzzle in deck.puzzles() {
            if let Some(first) = puzzle.first_move() {
                book.insert(book_key(&puzzle.fen), first.to_string());
            }
        }
        debug!(positions = book.len(), "Book engine loaded");
        Self { book }
    }

    /// Number of known positions.
    pub fn len(&self) -> usize {
        self.book.len()
    }

    /// Returns true when the book is empty.
    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }
}

#[async_trait(?Send)]
impl AiEngine for BookEngine {
    async fn is_ready(&self) -> bool {
        !self.book.is_empty()
    }

    #[instrument(skip(self))]
    async fn analyze_position(&self, fen: &str) -> Result<Analysis, HostError> {
        self.book
            .get(&book_key(fen))
            .map(|mv| Analysis {
                best_move: mv.clone(),
                evaluation: 0.0,
            })
            .ok_or_else(|| HostError::new(format!("Position not in book: {}", fen)))
    }
}
