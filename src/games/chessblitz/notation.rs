//! Lexical checks for squares, coordinate moves and FEN placement.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Characters allowed inside a FEN rank.
const FEN_RANK_CHARS: &str = "pnbrqkPNBRQK12345678";

/// Returns true for a square name such as `e4`.
pub fn is_valid_square(square: &str) -> bool {
    matches!(square.as_bytes(), [file, rank] if is_file(*file) && is_rank(*rank))
}

/// Returns true when `mv` is origin, destination and an optional
/// promotion letter, as in `e7e8q`.
pub fn matches_move_grammar(mv: &str) -> bool {
    match mv.as_bytes() {
        [f1, r1, f2, r2] => is_file(*f1) && is_rank(*r1) && is_file(*f2) && is_rank(*r2),
        [f1, r1, f2, r2, promo] => {
            is_file(*f1) && is_rank(*r1) && is_file(*f2) && is_rank(*r2) && b"qrbn".contains(promo)
        }
        _ => false,
    }
}

/// Returns true when the first two and the next two characters are each
/// a square name.
pub fn move_squares_valid(mv: &str) -> bool {
    match (mv.get(0..2), mv.get(2..4)) {
        (Some(from), Some(to)) => is_valid_square(from) && is_valid_square(to),
        _ => false,
    }
}

/// Structural FEN check: at least four space-separated fields and a
/// placement of exactly eight non-empty ranks drawn from piece letters and
/// the digits 1 to 8.
///
/// Rank widths are not summed; this is a shape check, not a legality check.
pub fn is_structurally_valid_fen(fen: &str) -> bool {
    let fields: Vec<&str> = fen.split(' ').collect();
    if fields.len() < 4 {
        return false;
    }
    let ranks: Vec<&str> = fields[0].split('/').collect();
    ranks.len() == 8
        && ranks
            .iter()
            .all(|rank| !rank.is_empty() && rank.chars().all(|c| FEN_RANK_CHARS.contains(c)))
}

fn is_file(byte: u8) -> bool {
    (b'a'..=b'h').contains(&byte)
}

fn is_rank(byte: u8) -> bool {
    (b'1'..=b'8').contains(&byte)
}

/// A board square addressed by display row and column.
///
/// Row 0 is rank 8 and column 0 is file a, matching how the board is drawn
/// from White's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    /// Creates a square from row and column, each in `0..8`.
    pub fn new(row: u8, col: u8) -> Option<Self> {
        (row < 8 && col < 8).then_some(Self { row, col })
    }

    /// Display row, 0 being rank 8.
    pub fn row(self) -> u8 {
        self.row
    }

    /// Display column, 0 being file a.
    pub fn col(self) -> u8 {
        self.col
    }

    /// File letter.
    pub fn file(self) -> char {
        char::from(b'a' + self.col)
    }

    /// Rank digit.
    pub fn rank(self) -> char {
        char::from(b'8' - self.row)
    }

    /// Square displaced by `(dr, dc)`, if still on the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(dr);
        let col = i16::from(self.col) + i16::from(dc);
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Self::new(row as u8, col as u8)
        } else {
            None
        }
    }

    /// All 64 squares in display order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Square { row, col }))
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Square {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [file, rank] if is_file(*file) && is_rank(*rank) => Ok(Self {
                row: b'8' - rank,
                col: file - b'a',
            }),
            _ => Err(NotationError::new(format!("Invalid square: {}", s))),
        }
    }
}

impl TryFrom<String> for Square {
    type Error = NotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

/// Piece a pawn promotes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Promotion {
    /// `q`
    Queen,
    /// `r`
    Rook,
    /// `b`
    Bishop,
    /// `n`
    Knight,
}

impl Promotion {
    /// Notation letter.
    pub fn letter(self) -> char {
        match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
        }
    }

    fn from_letter(letter: u8) -> Option<Self> {
        match letter {
            b'q' => Some(Self::Queen),
            b'r' => Some(Self::Rook),
            b'b' => Some(Self::Bishop),
            b'n' => Some(Self::Knight),
            _ => None,
        }
    }
}

/// A move in coordinate notation, for example `e2e4` or `e7e8q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Promotion piece, if any.
    pub promotion: Option<Promotion>,
}

impl UciMove {
    /// Creates a non-promoting move.
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }
}

impl std::fmt::Display for UciMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.letter())?;
        }
        Ok(())
    }
}

impl FromStr for UciMove {
    type Err = NotationError;

    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !matches_move_grammar(s) {
            return Err(NotationError::new(format!("Invalid move: {}", s)));
        }
        let from: Square = s[0..2].parse()?;
        let to: Square = s[2..4].parse()?;
        let promotion = s.as_bytes().get(4).copied().and_then(Promotion::from_letter);
        Ok(Self { from, to, promotion })
    }
}

/// Malformed square or move text.
#[derive(Debug, Clone, Display, Error)]
#[display("Notation error: {} at {}:{}", message, file, line)]
pub struct NotationError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl NotationError {
    /// Creates a new notation error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
