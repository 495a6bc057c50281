//! Core domain types for the puzzle arena.

use super::notation::Square;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum Side {
    /// White moves.
    #[default]
    White,
    /// Black moves.
    Black,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Parses the FEN active-colour field.
    pub fn from_fen_field(field: &str) -> Option<Self> {
        match field {
            "w" => Some(Side::White),
            "b" => Some(Side::Black),
            _ => None,
        }
    }
}

/// Consumable power-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PowerKind {
    /// Reveals the first solution move.
    Hint,
    /// Stops the turn timer.
    Freeze,
    /// Loads another puzzle without penalty.
    Skip,
    /// Doubles XP for the next correct answer.
    Double,
}

/// Remaining power-up counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Powers {
    /// Hints left.
    pub hint: i64,
    /// Timer freezes left.
    pub freeze: i64,
    /// Skips left.
    pub skip: i64,
    /// Double-XP activations left.
    pub double: i64,
}

impl Powers {
    /// Count for `kind`.
    pub fn count(&self, kind: PowerKind) -> i64 {
        match kind {
            PowerKind::Hint => self.hint,
            PowerKind::Freeze => self.freeze,
            PowerKind::Skip => self.skip,
            PowerKind::Double => self.double,
        }
    }

    /// Mutable count for `kind`.
    pub fn count_mut(&mut self, kind: PowerKind) -> &mut i64 {
        match kind {
            PowerKind::Hint => &mut self.hint,
            PowerKind::Freeze => &mut self.freeze,
            PowerKind::Skip => &mut self.skip,
            PowerKind::Double => &mut self.double,
        }
    }
}

impl Default for Powers {
    fn default() -> Self {
        Self {
            hint: 3,
            freeze: 2,
            skip: 2,
            double: 1,
        }
    }
}

/// A single puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Short description.
    #[serde(default)]
    pub title: String,
    /// Starting position.
    pub fen: String,
    /// Expected moves in order.
    pub solution: Vec<String>,
    /// Difficulty rating.
    pub rating: i64,
    /// Side the solver plays.
    pub to_move: Side,
    /// Optional hint text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Puzzle {
    /// First expected move, if the solution is not empty.
    pub fn first_move(&self) -> Option<&str> {
        self.solution.first().map(String::as_str)
    }
}

/// The arena's mutable game state.
///
/// Field names serialise in camelCase, which is the layout persisted under
/// the game-state key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    /// Puzzle rating.
    pub rating: i64,
    /// Player level.
    pub level: i64,
    /// XP toward the next level.
    pub xp: i64,
    /// XP needed for the next level.
    pub xp_to_level: i64,
    /// Currency balance.
    pub coins: i64,
    /// Consecutive correct answers.
    pub streak: i64,
    /// Best streak so far.
    pub best_streak: i64,
    /// Seconds left on the turn timer.
    pub timer: i64,
    /// Whether the timer is frozen.
    pub timer_frozen: bool,
    /// Whether the next correct answer earns double XP.
    pub double_xp_active: bool,
    /// Total puzzles solved.
    pub puzzles_solved: i64,
    /// Power-up counts.
    pub powers: Powers,
    /// Puzzle on the board.
    pub current_puzzle: Option<Puzzle>,
    /// Whether the placement assessment is running.
    pub in_assessment: bool,
    /// Assessment puzzle number, 1-based; 0 when not started.
    pub assessment_puzzle: usize,
    /// Per-puzzle assessment outcomes.
    pub assessment_results: Vec<bool>,
    /// Square the player has selected.
    pub selected_square: Option<Square>,
    /// Instruction line shown above the board.
    pub instruction: String,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            rating: 800,
            level: 1,
            xp: 0,
            xp_to_level: 100,
            coins: 0,
            streak: 0,
            best_streak: 0,
            timer: 30,
            timer_frozen: false,
            double_xp_active: false,
            puzzles_solved: 0,
            powers: Powers::default(),
            current_puzzle: None,
            in_assessment: false,
            assessment_puzzle: 0,
            assessment_results: Vec::new(),
            selected_square: None,
            instruction: String::new(),
        }
    }
}

/// Named rating bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RatingTier {
    /// Below 800.
    Beginner,
    /// 800 and up.
    Novice,
    /// 1200 and up.
    Intermediate,
    /// 1600 and up.
    Advanced,
    /// 2000 and up.
    Expert,
    /// 2400 and up.
    Master,
    /// 2800 and up.
    Grandmaster,
}

impl RatingTier {
    /// Lowest rating in the band.
    pub fn min_rating(self) -> i64 {
        match self {
            Self::Beginner => i64::MIN,
            Self::Novice => 800,
            Self::Intermediate => 1200,
            Self::Advanced => 1600,
            Self::Expert => 2000,
            Self::Master => 2400,
            Self::Grandmaster => 2800,
        }
    }

    /// Band containing `rating`. Every rating has one.
    pub fn for_rating(rating: i64) -> Self {
        Self::iter()
            .rev()
            .find(|tier| rating >= tier.min_rating())
            .unwrap_or(Self::Beginner)
    }

    /// Display name.
    pub fn name(self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serializes_camel_case() {
        let json = serde_json::to_value(GameState::default()).expect("serialize failed");
        assert_eq!(json["xpToLevel"], 100);
        assert_eq!(json["powers"]["hint"], 3);
        assert!(json["currentPuzzle"].is_null());
    }

    #[test]
    fn test_partial_state_fills_defaults() {
        let state: GameState =
            serde_json::from_str(r#"{"coins": 99999, "level": 50}"#).expect("deserialize failed");
        assert_eq!(state.coins, 99999);
        assert_eq!(state.level, 50);
        assert_eq!(state.rating, 800);
    }

    #[test]
    fn test_rating_tiers() {
        assert_eq!(RatingTier::for_rating(1200), RatingTier::Intermediate);
        assert_eq!(RatingTier::for_rating(5000), RatingTier::Grandmaster);
        assert_eq!(RatingTier::for_rating(-20), RatingTier::Beginner);
    }

    #[test]
    fn test_power_kind_names() {
        assert_eq!("freeze".parse::<PowerKind>().expect("known power"), PowerKind::Freeze);
        assert_eq!(PowerKind::Double.to_string(), "double");
    }
}
