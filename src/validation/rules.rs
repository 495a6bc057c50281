//! Declarative rule table keyed by field path.

use super::path::FieldPath;
use crate::games::chessblitz::notation;
use serde_json::Value;
use strum::{Display, EnumIter};
use tracing::instrument;

/// Top-level fields a game state must carry.
pub const REQUIRED_STATE_FIELDS: [&str; 6] = ["rating", "level", "xp", "coins", "streak", "powers"];

/// Fields a puzzle must carry.
pub const REQUIRED_PUZZLE_FIELDS: [&str; 3] = ["fen", "solution", "toMove"];

/// Predicate over a resolved field value.
///
/// Numeric constraints reject anything that is not a JSON number,
/// including `null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Inclusive numeric range.
    Range {
        /// Lowest accepted value.
        min: f64,
        /// Highest accepted value.
        max: f64,
    },
    /// Numeric lower bound, inclusive.
    AtLeast(f64),
    /// A string with more than this many characters.
    TextLongerThan(usize),
    /// A list with at least one entry.
    NonEmptyList,
    /// One of a fixed set of strings.
    OneOf(Vec<String>),
}

impl Constraint {
    /// Returns true when `value` satisfies the constraint.
    pub fn holds(&self, value: &Value) -> bool {
        match self {
            Self::Range { min, max } => value.as_f64().is_some_and(|v| v >= *min && v <= *max),
            Self::AtLeast(min) => value.as_f64().is_some_and(|v| v >= *min),
            Self::TextLongerThan(len) => value.as_str().is_some_and(|s| s.chars().count() > *len),
            Self::NonEmptyList => value.as_array().is_some_and(|items| !items.is_empty()),
            Self::OneOf(options) => value
                .as_str()
                .is_some_and(|s| options.iter().any(|option| option == s)),
        }
    }
}

/// A constraint attached to a field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    path: FieldPath,
    constraint: Constraint,
}

impl FieldRule {
    /// Creates a rule for the dotted `path`.
    pub fn new(path: &str, constraint: Constraint) -> Self {
        Self {
            path: FieldPath::parse(path),
            constraint,
        }
    }

    /// Path the rule inspects.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Constraint applied to the resolved value.
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }
}

/// Rule table namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum RuleNamespace {
    /// Rules over a game-state record.
    GameState,
    /// Rules over a puzzle record.
    Puzzle,
    /// Rules over a move string.
    Move,
}

/// Checks applied to a move string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum MoveRule {
    /// Whole-string grammar: origin, destination and optional promotion.
    Format,
    /// Origin and destination are each a board square.
    Squares,
}

impl MoveRule {
    /// Returns true when `mv` passes this rule.
    pub fn holds(self, mv: &str) -> bool {
        match self {
            Self::Format => notation::matches_move_grammar(mv),
            Self::Squares => notation::move_squares_valid(mv),
        }
    }

    /// Message recorded when `mv` fails this rule.
    pub fn failure_message(self, mv: &str) -> String {
        match self {
            Self::Format => format!("Invalid move format: {}", mv),
            Self::Squares => format!("Invalid squares in move: {}", mv),
        }
    }
}

/// The full rule table. Built once and never mutated by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRules {
    game_state: Vec<FieldRule>,
    puzzle: Vec<FieldRule>,
    moves: Vec<MoveRule>,
}

impl ValidationRules {
    /// The arena's standard table.
    #[instrument]
    pub fn standard() -> Self {
        let count = || Constraint::Range { min: 0.0, max: 100.0 };
        Self {
            game_state: vec![
                FieldRule::new("rating", Constraint::Range { min: 100.0, max: 5000.0 }),
                FieldRule::new("level", Constraint::Range { min: 1.0, max: 10000.0 }),
                FieldRule::new("xp", Constraint::AtLeast(0.0)),
                FieldRule::new("coins", Constraint::AtLeast(0.0)),
                FieldRule::new("streak", Constraint::AtLeast(0.0)),
                FieldRule::new("timer", Constraint::Range { min: 0.0, max: 60.0 }),
                FieldRule::new("powers.hint", count()),
                FieldRule::new("powers.freeze", count()),
                FieldRule::new("powers.skip", count()),
                FieldRule::new("powers.double", count()),
            ],
            puzzle: vec![
                FieldRule::new("fen", Constraint::TextLongerThan(10)),
                FieldRule::new("solution", Constraint::NonEmptyList),
                FieldRule::new("rating", Constraint::Range { min: 100.0, max: 3500.0 }),
                FieldRule::new(
                    "toMove",
                    Constraint::OneOf(vec!["White".to_string(), "Black".to_string()]),
                ),
            ],
            moves: vec![MoveRule::Format, MoveRule::Squares],
        }
    }

    /// Builds a table from explicit parts.
    pub fn new(game_state: Vec<FieldRule>, puzzle: Vec<FieldRule>, moves: Vec<MoveRule>) -> Self {
        Self {
            game_state,
            puzzle,
            moves,
        }
    }

    /// Field rules in a record namespace. [`RuleNamespace::Move`] has none.
    pub fn field_rules(&self, namespace: RuleNamespace) -> &[FieldRule] {
        match namespace {
            RuleNamespace::GameState => &self.game_state,
            RuleNamespace::Puzzle => &self.puzzle,
            RuleNamespace::Move => &[],
        }
    }

    /// Move rules in evaluation order.
    pub fn move_rules(&self) -> &[MoveRule] {
        &self.moves
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_edges() {
        let rating = Constraint::Range { min: 100.0, max: 5000.0 };
        assert!(rating.holds(&json!(100)));
        assert!(rating.holds(&json!(5000)));
        assert!(!rating.holds(&json!(99)));
        assert!(!rating.holds(&json!(5001)));
        assert!(!rating.holds(&Value::Null));
        assert!(!rating.holds(&json!("1200")));
    }

    #[test]
    fn test_text_and_list_constraints() {
        assert!(!Constraint::TextLongerThan(10).holds(&json!("8/8/8/8/8")));
        assert!(Constraint::TextLongerThan(10).holds(&json!("8/8/8/8/8/8/8/8 w")));
        assert!(!Constraint::NonEmptyList.holds(&json!([])));
        assert!(Constraint::NonEmptyList.holds(&json!(["e2e4"])));
    }

    #[test]
    fn test_namespace_names() {
        assert_eq!(RuleNamespace::GameState.to_string(), "gameState");
        assert_eq!(MoveRule::Squares.to_string(), "squares");
    }

    #[test]
    fn test_standard_table_shape() {
        let rules = ValidationRules::standard();
        assert_eq!(rules.field_rules(RuleNamespace::GameState).len(), 10);
        assert_eq!(rules.field_rules(RuleNamespace::Puzzle).len(), 4);
        assert!(rules.field_rules(RuleNamespace::Move).is_empty());
        assert_eq!(rules.move_rules().len(), 2);
    }
}
