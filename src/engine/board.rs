//! Mailbox chess position.
//!
//! `Position` stores one optional [`Piece`] per square, the side to move,
//! castling rights, the en-passant target and the move counters. A position
//! is never mutated once handed out: [`Position::apply`] returns a new value.

use crate::engine::movegen;
use crate::engine::moves::Move;
use crate::engine::piece::Piece;
use crate::engine::transition;
use crate::engine::types::{Alliance, CastlingRights, ChessError, GameStatus, PieceType, Square};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    squares: [Option<Piece>; 64],
    side_to_move: Alliance,
    castling_rights: CastlingRights,
    /// The square *behind* a pawn that just double-stepped.
    en_passant: Option<Square>,
    halfmove_clock: u16,
    fullmove_number: u16,
}

impl Position {
    fn blank() -> Self {
        Position {
            squares: [None; 64],
            side_to_move: Alliance::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is always valid")
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Alliance {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Every piece belonging to `alliance`, in square order.
    pub fn pieces_of(&self, alliance: Alliance) -> impl Iterator<Item = Piece> + '_ {
        self.squares
            .iter()
            .flatten()
            .copied()
            .filter(move |p| p.alliance() == alliance)
    }

    pub fn king_square(&self, alliance: Alliance) -> Option<Square> {
        self.pieces_of(alliance)
            .find(|p| p.kind() == PieceType::King)
            .map(|p| p.square())
    }

    /// Is the side to move's king attacked?
    pub fn is_in_check(&self) -> bool {
        let us = self.side_to_move;
        self.king_square(us)
            .is_some_and(|king| movegen::is_square_attacked(self, king, !us))
    }

    // -----------------------------------------------------------------------
    // Rules shortcuts
    // -----------------------------------------------------------------------

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(self)
    }

    /// The position after `mv`. Fails if `mv` is not legal here.
    pub fn apply(&self, mv: &Move) -> Result<Position, ChessError> {
        transition::apply(self, mv)
    }

    pub fn classify(&self) -> GameStatus {
        movegen::classify(self)
    }

    // -----------------------------------------------------------------------
    // Low-level editing, used only while building a successor
    // -----------------------------------------------------------------------

    #[inline]
    pub(crate) fn place(&mut self, piece: Piece) {
        self.squares[piece.square().index()] = Some(piece);
    }

    #[inline]
    pub(crate) fn clear(&mut self, sq: Square) {
        self.squares[sq.index()] = None;
    }

    pub(crate) fn set_side_to_move(&mut self, alliance: Alliance) {
        self.side_to_move = alliance;
    }

    pub(crate) fn set_en_passant(&mut self, sq: Option<Square>) {
        self.en_passant = sq;
    }

    pub(crate) fn restrict_castling(&mut self, touched: Square) {
        self.castling_rights.0 &= CASTLING_MASK[touched.index()];
    }

    pub(crate) fn set_clocks(&mut self, halfmove: u16, fullmove: u16) {
        self.halfmove_clock = halfmove;
        self.fullmove_number = fullmove;
    }

    // -----------------------------------------------------------------------
    // Consistency check (debug builds)
    // -----------------------------------------------------------------------

    /// Verify that every occupant records its own square and each side has
    /// exactly one king. Available in debug builds and test builds.
    #[cfg(any(debug_assertions, test))]
    pub fn assert_consistent(&self) {
        for sq in Square::all() {
            if let Some(piece) = self.piece_at(sq) {
                assert_eq!(piece.square(), sq, "piece on {sq} records {}", piece.square());
            }
        }
        for alliance in [Alliance::White, Alliance::Black] {
            let kings = self
                .pieces_of(alliance)
                .filter(|p| p.kind() == PieceType::King)
                .count();
            assert_eq!(kings, 1, "{alliance} has {kings} kings");
        }
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top).
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                s.push(self.piece_at(sq).map_or('.', |p| p.to_char()));
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

/// Castling rights surviving a move that touches each square. A move from or
/// to a1 clears white-queenside; e1 clears both white rights; and so on.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0]  = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    mask[4]  = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    mask[7]  = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    mask
};

/// Whether a piece read from FEN should count as not having moved yet.
///
/// Kings and rooks follow the castling field; everything else is unmoved
/// only on its home square.
fn infer_first_move(kind: PieceType, alliance: Alliance, sq: Square, rights: CastlingRights) -> bool {
    let home_rank = alliance.back_rank();
    match kind {
        PieceType::Pawn => sq.rank() == alliance.pawn_start_rank(),
        PieceType::King => {
            sq == Square::from_file_rank(4, home_rank)
                && (rights.can_castle_kingside(alliance) || rights.can_castle_queenside(alliance))
        }
        PieceType::Rook => {
            (sq == Square::from_file_rank(7, home_rank) && rights.can_castle_kingside(alliance))
                || (sq == Square::from_file_rank(0, home_rank)
                    && rights.can_castle_queenside(alliance))
        }
        PieceType::Knight => sq.rank() == home_rank && matches!(sq.file(), 1 | 6),
        PieceType::Bishop => sq.rank() == home_rank && matches!(sq.file(), 2 | 5),
        PieceType::Queen => sq == Square::from_file_rank(3, home_rank),
    }
}

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// Validates all 6 fields and ensures exactly one king per side. Castling
    /// flags for which the king or rook is not on its home square are dropped.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::blank();

        // ----- Field 3 first: first-move flags depend on it -----
        let rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 1: Piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some((alliance, kind)) = PieceType::from_char(ch) {
                    let sq = Square::from_file_rank(file, rank);
                    let first_move = infer_first_move(kind, alliance, sq, rights);
                    pos.place(Piece::with_first_move(kind, alliance, sq, first_move));
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        for alliance in [Alliance::White, Alliance::Black] {
            let kings = pos
                .pieces_of(alliance)
                .filter(|p| p.kind() == PieceType::King)
                .count();
            if kings != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{alliance} has {kings} kings (expected 1)"
                )));
            }
        }

        // Keep only the rights whose king and rook are actually unmoved.
        let mut effective = rights;
        for alliance in [Alliance::White, Alliance::Black] {
            let rank = alliance.back_rank();
            let unmoved = |file: u8| {
                pos.piece_at(Square::from_file_rank(file, rank))
                    .is_some_and(|p| p.alliance() == alliance && p.is_first_move())
            };
            if !unmoved(4) || !unmoved(7) {
                effective.remove(CastlingRights::kingside_flag(alliance));
            }
            if !unmoved(4) || !unmoved(0) {
                effective.remove(CastlingRights::queenside_flag(alliance));
            }
        }
        pos.castling_rights = effective;

        // ----- Field 2: Side to move -----
        pos.side_to_move = match fields[1] {
            "w" => Alliance::White,
            "b" => Alliance::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        let waiting = !pos.side_to_move;
        if pos
            .king_square(waiting)
            .is_some_and(|king| movegen::is_square_attacked(&pos, king, pos.side_to_move))
        {
            return Err(ChessError::InvalidFen(format!(
                "{waiting} is in check but it is not their move"
            )));
        }

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            // Behind a white pawn (rank 3) when black is to move, and vice versa.
            let expected_rank = match pos.side_to_move {
                Alliance::White => 5,
                Alliance::Black => 2,
            };
            if ep_sq.rank() != expected_rank {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} does not match side to move",
                    fields[3]
                )));
            }
            pos.en_passant = Some(ep_sq);
        }

        // ----- Field 5: Halfmove clock -----
        pos.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        pos.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if pos.fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        #[cfg(debug_assertions)]
        pos.assert_consistent();

        Ok(pos)
    }

    /// Export the position as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.piece_at(Square::from_file_rank(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Alliance::White => 'w',
            Alliance::Black => 'b',
        });

        fen.push(' ');
        fen.push_str(&self.castling_rights.to_fen());

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
