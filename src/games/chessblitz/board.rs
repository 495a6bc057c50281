//! FEN-driven board with pseudo-legal move generation.
//!
//! Enough for selection and highlighting: no castling, no en passant and
//! no check detection.

use super::notation::{NotationError, Promotion, Square, UciMove, is_structurally_valid_fen};
use super::types::Side;
use tracing::{debug, instrument};

/// FEN of the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Kind of chess piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    /// Pawn.
    Pawn,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
    /// Queen.
    Queen,
    /// King.
    King,
}

/// A piece with its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    /// Owner.
    pub side: Side,
    /// Kind.
    pub kind: PieceKind,
}

impl Piece {
    /// Parses a FEN piece letter. Uppercase is White.
    pub fn from_fen_char(c: char) -> Option<Self> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let side = if c.is_ascii_uppercase() { Side::White } else { Side::Black };
        Some(Self { side, kind })
    }

    /// FEN letter.
    pub fn fen_char(self) -> char {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.side {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }
}

/// 8x8 board indexed by display row and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    side_to_move: Side,
}

impl Board {
    /// An empty board with White to move.
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            side_to_move: Side::White,
        }
    }

    /// The standard starting position.
    pub fn start_position() -> Self {
        match Self::from_fen(START_FEN) {
            Ok(board) => board,
            Err(_) => Self::empty(),
        }
    }

    /// Parses placement and active colour from a FEN string.
    ///
    /// # Errors
    ///
    /// Fails when the FEN is structurally invalid or a rank does not
    /// describe exactly eight files.
    #[instrument]
    pub fn from_fen(fen: &str) -> Result<Self, NotationError> {
        if !is_structurally_valid_fen(fen) {
            return Err(NotationError::new(format!("Invalid FEN: {}", fen)));
        }
        let mut fields = fen.split(' ');
        let placement = fields.next().unwrap_or_default();
        let side_to_move = fields
            .next()
            .and_then(Side::from_fen_field)
            .ok_or_else(|| NotationError::new(format!("Invalid active colour in FEN: {}", fen)))?;

        let mut squares = [[None; 8]; 8];
        for (row, rank) in placement.split('/').enumerate() {
            let mut col = 0usize;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    if col < 8 {
                        squares[row][col] = Some(piece);
                    }
                    col += 1;
                }
                if col > 8 {
                    break;
                }
            }
            if col != 8 {
                return Err(NotationError::new(format!(
                    "Rank {} of FEN does not span 8 files: {}",
                    8 - row,
                    rank
                )));
            }
        }
        Ok(Self {
            squares,
            side_to_move,
        })
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Piece on `square`.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[usize::from(square.row())][usize::from(square.col())]
    }

    /// Number of pieces `side` has on the board.
    pub fn piece_count(&self, side: Side) -> usize {
        Square::all()
            .filter(|sq| self.piece_at(*sq).is_some_and(|p| p.side == side))
            .count()
    }

    /// Destinations reachable by the piece on `from`, ignoring checks.
    pub fn pseudo_legal_targets(&self, from: Square) -> Vec<Square> {
        let Some(piece) = self.piece_at(from) else {
            return Vec::new();
        };
        match piece.kind {
            PieceKind::Pawn => self.pawn_targets(from, piece.side),
            PieceKind::Knight => self.step_targets(from, piece.side, &KNIGHT_STEPS),
            PieceKind::King => {
                let mut steps = ORTHOGONAL.to_vec();
                steps.extend_from_slice(&DIAGONAL);
                self.step_targets(from, piece.side, &steps)
            }
            PieceKind::Bishop => self.slide_targets(from, piece.side, &DIAGONAL),
            PieceKind::Rook => self.slide_targets(from, piece.side, &ORTHOGONAL),
            PieceKind::Queen => {
                let mut targets = self.slide_targets(from, piece.side, &ORTHOGONAL);
                targets.extend(self.slide_targets(from, piece.side, &DIAGONAL));
                targets
            }
        }
    }

    /// Returns true when `mv` moves a piece of the side to move to one of
    /// its pseudo-legal targets.
    pub fn is_pseudo_legal(&self, mv: &UciMove) -> bool {
        self.piece_at(mv.from)
            .is_some_and(|p| p.side == self.side_to_move)
            && self.pseudo_legal_targets(mv.from).contains(&mv.to)
    }

    /// Plays `mv` if it is pseudo-legal. Returns whether it was played.
    #[instrument(skip(self), fields(mv = %mv))]
    pub fn try_move(&mut self, mv: &UciMove) -> bool {
        if !self.is_pseudo_legal(mv) {
            debug!("Move rejected");
            return false;
        }
        let Some(mut piece) = self.piece_at(mv.from) else {
            return false;
        };
        let last_rank = match piece.side {
            Side::White => 0,
            Side::Black => 7,
        };
        if piece.kind == PieceKind::Pawn && mv.to.row() == last_rank {
            piece.kind = match mv.promotion.unwrap_or(Promotion::Queen) {
                Promotion::Queen => PieceKind::Queen,
                Promotion::Rook => PieceKind::Rook,
                Promotion::Bishop => PieceKind::Bishop,
                Promotion::Knight => PieceKind::Knight,
            };
        }
        self.set(mv.from, None);
        self.set(mv.to, Some(piece));
        self.side_to_move = self.side_to_move.opponent();
        true
    }

    fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[usize::from(square.row())][usize::from(square.col())] = piece;
    }

    fn pawn_targets(&self, from: Square, side: Side) -> Vec<Square> {
        let (dir, start_row) = match side {
            Side::White => (-1, 6),
            Side::Black => (1, 1),
        };
        let mut targets = Vec::new();
        if let Some(one) = from.offset(dir, 0).filter(|sq| self.piece_at(*sq).is_none()) {
            targets.push(one);
            if from.row() == start_row {
                if let Some(two) = one.offset(dir, 0).filter(|sq| self.piece_at(*sq).is_none()) {
                    targets.push(two);
                }
            }
        }
        for dc in [-1, 1] {
            if let Some(diag) = from.offset(dir, dc) {
                if self.piece_at(diag).is_some_and(|p| p.side != side) {
                    targets.push(diag);
                }
            }
        }
        targets
    }

    fn step_targets(&self, from: Square, side: Side, steps: &[(i8, i8)]) -> Vec<Square> {
        steps
            .iter()
            .filter_map(|(dr, dc)| from.offset(*dr, *dc))
            .filter(|sq| self.piece_at(*sq).is_none_or(|p| p.side != side))
            .collect()
    }

    fn slide_targets(&self, from: Square, side: Side, directions: &[(i8, i8)]) -> Vec<Square> {
        let mut targets = Vec::new();
        for (dr, dc) in directions {
            let mut cursor = from;
            while let Some(next) = cursor.offset(*dr, *dc) {
                match self.piece_at(next) {
                    None => targets.push(next),
                    Some(p) => {
                        if p.side != side {
                            targets.push(next);
                        }
                        break;
                    }
                }
                cursor = next;
            }
        }
        targets
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::start_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().expect("valid square")
    }

    #[test]
    fn test_start_position_counts() {
        let board = Board::start_position();
        assert_eq!(board.piece_count(Side::White), 16);
        assert_eq!(board.piece_count(Side::Black), 16);
        assert_eq!(board.side_to_move(), Side::White);
    }

    #[test]
    fn test_pawn_and_knight_targets() {
        let board = Board::start_position();
        let mut pawn = board.pseudo_legal_targets(sq("e2"));
        pawn.sort();
        assert_eq!(pawn, vec![sq("e4"), sq("e3")]);
        assert_eq!(board.pseudo_legal_targets(sq("g1")).len(), 2);
        assert!(board.pseudo_legal_targets(sq("a1")).is_empty());
    }

    #[test]
    fn test_try_move_switches_side() {
        let mut board = Board::start_position();
        assert!(board.try_move(&"e2e4".parse().expect("valid move")));
        assert_eq!(board.side_to_move(), Side::Black);
        assert!(!board.try_move(&"e4e5".parse().expect("valid move")));
    }

    #[test]
    fn test_rank_width_checked() {
        assert!(Board::from_fen("rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 x - - 0 1").is_err());
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        let mut board = Board::from_fen("8/4P1k1/8/8/8/8/6K1/8 w - - 0 1").expect("valid fen");
        assert!(board.try_move(&"e7e8".parse().expect("valid move")));
        let piece = board.piece_at(sq("e8")).expect("promoted piece");
        assert_eq!(piece.kind, PieceKind::Queen);
    }
}
