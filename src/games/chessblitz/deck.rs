//! Puzzle collection with sequential, rated and progressive selection.

use super::types::{Puzzle, Side};
use tracing::{debug, instrument};

/// An ordered set of puzzles and a cursor for sequential play.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuzzleDeck {
    puzzles: Vec<Puzzle>,
    cursor: usize,
}

fn puzzle(id: &str, title: &str, fen: &str, solution: &str, rating: i64, to_move: Side) -> Puzzle {
    Puzzle {
        id: id.to_string(),
        title: title.to_string(),
        fen: fen.to_string(),
        solution: vec![solution.to_string()],
        rating,
        to_move,
        hint: None,
    }
}

impl PuzzleDeck {
    /// Creates a deck from `puzzles`, in play order.
    pub fn new(puzzles: Vec<Puzzle>) -> Self {
        Self { puzzles, cursor: 0 }
    }

    /// A deck with no puzzles.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in puzzle set.
    #[instrument]
    pub fn standard() -> Self {
        use Side::{Black, White};
        Self::new(vec![
            puzzle(
                "scholars-mate",
                "Scholar's mate",
                "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
                "h5f7",
                600,
                White,
            ),
            puzzle(
                "corner-back-rank",
                "Corner back rank",
                "1k6/ppp5/8/8/8/8/8/K6R w - - 0 1",
                "h1h8",
                700,
                White,
            ),
            puzzle(
                "back-rank",
                "Back rank",
                "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
                "d1d8",
                800,
                White,
            ),
            puzzle(
                "back-rank-black",
                "Back rank for Black",
                "3r2k1/8/8/8/8/8/5PPP/6K1 b - - 0 1",
                "d8d1",
                900,
                Black,
            ),
            puzzle(
                "royal-fork",
                "Royal fork",
                "r3k3/8/8/1N6/8/8/8/4K3 w - - 0 1",
                "b5c7",
                1000,
                White,
            ),
            puzzle(
                "rook-ladder",
                "Rook and king",
                "k7/8/1K6/8/8/8/8/7R w - - 0 1",
                "h1h8",
                1100,
                White,
            ),
            puzzle(
                "promotion",
                "Promote",
                "8/4P1k1/8/8/8/8/6K1/8 w - - 0 1",
                "e7e8q",
                1200,
                White,
            ),
            puzzle(
                "queen-file",
                "Long file",
                "7k/8/6K1/8/8/8/8/Q7 w - - 0 1",
                "a1a8",
                1400,
                White,
            ),
            puzzle(
                "opposition-mate",
                "Opposition mate",
                "6k1/8/6K1/8/8/8/8/R7 w - - 0 1",
                "a1a8",
                1500,
                White,
            ),
            puzzle(
                "smothered",
                "Smothered knight",
                "6rk/6pp/7N/8/8/8/8/6K1 w - - 0 1",
                "h6f7",
                1600,
                White,
            ),
        ])
    }

    /// Number of puzzles.
    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    /// Returns true when the deck holds no puzzles.
    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    /// All puzzles in play order.
    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    /// Next puzzle in play order, wrapping around.
    #[instrument(skip(self))]
    pub fn next_puzzle(&mut self) -> Option<Puzzle> {
        if self.puzzles.is_empty() {
            return None;
        }
        let picked = self.puzzles[self.cursor % self.puzzles.len()].clone();
        self.cursor = (self.cursor + 1) % self.puzzles.len();
        debug!(id = %picked.id, "Dealt puzzle");
        Some(picked)
    }

    /// Puzzle whose rating is closest to `rating`.
    pub fn nearest_rated(&self, rating: i64) -> Option<Puzzle> {
        self.puzzles
            .iter()
            .min_by_key(|p| (p.rating - rating).abs())
            .cloned()
    }

    /// Puzzle for step `index` (1-based) of a `count`-step assessment.
    ///
    /// Steps walk the deck from easiest to hardest, so ratings never
    /// decrease as `index` grows.
    pub fn assessment_puzzle(&self, index: usize, count: usize) -> Option<Puzzle> {
        if self.puzzles.is_empty() || index == 0 {
            return None;
        }
        let mut ordered: Vec<&Puzzle> = self.puzzles.iter().collect();
        ordered.sort_by_key(|p| p.rating);
        let last = ordered.len() - 1;
        let step = index.min(count.max(1)) - 1;
        let position = if count > 1 { step * last / (count - 1) } else { 0 };
        ordered.get(position).map(|p| (*p).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chessblitz::board::Board;
    use crate::games::chessblitz::notation::UciMove;

    #[test]
    fn test_standard_solutions_are_playable() {
        for p in PuzzleDeck::standard().puzzles() {
            let mut board = Board::from_fen(&p.fen).expect("valid fen");
            assert_eq!(board.side_to_move(), p.to_move, "{}", p.id);
            let mv: UciMove = p.solution[0].parse().expect("valid move");
            assert!(board.try_move(&mv), "{} solution not playable", p.id);
        }
    }

    #[test]
    fn test_assessment_is_progressive() {
        let deck = PuzzleDeck::standard();
        let ratings: Vec<i64> = (1..=10)
            .filter_map(|i| deck.assessment_puzzle(i, 10))
            .map(|p| p.rating)
            .collect();
        assert_eq!(ratings.len(), 10);
        assert!(ratings.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_empty_deck_yields_nothing() {
        let mut deck = PuzzleDeck::empty();
        assert!(deck.next_puzzle().is_none());
        assert!(deck.nearest_rated(1200).is_none());
        assert!(deck.assessment_puzzle(1, 10).is_none());
    }
}
