//! Pieces and their per-variant move generation.
//!
//! A [`Piece`] is an immutable value bound to one square. Moving a piece
//! produces a new value at the destination. Generation is dispatched with an
//! exhaustive match over [`PieceType`], so every variant's behaviour lives in
//! this file and a new variant will not compile until it is handled here.

use crate::engine::board::Position;
use crate::engine::geometry;
use crate::engine::movegen;
use crate::engine::moves::{CastleSide, Move};
use crate::engine::types::{Alliance, CastlingRights, PieceType, Square};

const KNIGHT_OFFSETS: [i8; 8] = [-17, -15, -10, -6, 6, 10, 15, 17];
const KING_OFFSETS: [i8; 8] = [-9, -8, -7, -1, 1, 7, 8, 9];
const BISHOP_VECTORS: [i8; 4] = [-9, -7, 7, 9];
const ROOK_VECTORS: [i8; 4] = [-8, -1, 1, 8];
const QUEEN_VECTORS: [i8; 8] = [-9, -8, -7, -1, 1, 7, 8, 9];

/// A piece standing on a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceType,
    alliance: Alliance,
    square: Square,
    first_move: bool,
}

impl Piece {
    /// A piece that has not moved yet.
    pub fn new(kind: PieceType, alliance: Alliance, square: Square) -> Self {
        Self::with_first_move(kind, alliance, square, true)
    }

    pub fn with_first_move(
        kind: PieceType,
        alliance: Alliance,
        square: Square,
        first_move: bool,
    ) -> Self {
        Piece {
            kind,
            alliance,
            square,
            first_move,
        }
    }

    #[inline]
    pub fn kind(&self) -> PieceType {
        self.kind
    }

    #[inline]
    pub fn alliance(&self) -> Alliance {
        self.alliance
    }

    #[inline]
    pub fn square(&self) -> Square {
        self.square
    }

    #[inline]
    pub fn is_first_move(&self) -> bool {
        self.first_move
    }

    /// FEN letter for this piece.
    pub fn to_char(&self) -> char {
        self.kind.to_char(self.alliance)
    }

    /// The value this piece becomes after moving to `to`.
    pub(crate) fn moved_to(self, to: Square) -> Piece {
        Piece {
            square: to,
            first_move: false,
            ..self
        }
    }

    /// The piece a pawn becomes on promotion.
    pub(crate) fn promoted(self, kind: PieceType, to: Square) -> Piece {
        Piece {
            kind,
            square: to,
            first_move: false,
            ..self
        }
    }

    // -----------------------------------------------------------------------
    // Generation
    // -----------------------------------------------------------------------

    /// Moves consistent with this piece's movement pattern and the board's
    /// occupancy, ignoring whether the mover's king is left attacked.
    pub fn pseudo_legal_moves(&self, pos: &Position) -> Vec<Move> {
        let mut moves = Vec::new();
        match self.kind {
            PieceType::Pawn => pawn_moves(self, pos, &mut moves),
            PieceType::Knight => stepping_moves(self, pos, &KNIGHT_OFFSETS, &mut moves),
            PieceType::Bishop => sliding_moves(self, pos, &BISHOP_VECTORS, &mut moves),
            PieceType::Rook => sliding_moves(self, pos, &ROOK_VECTORS, &mut moves),
            PieceType::Queen => sliding_moves(self, pos, &QUEEN_VECTORS, &mut moves),
            PieceType::King => {
                stepping_moves(self, pos, &KING_OFFSETS, &mut moves);
                castle_moves(self, pos, &mut moves);
            }
        }
        moves
    }

    /// Does this piece attack `target`? Castling and pawn pushes never
    /// attack; pawn diagonals attack whether or not anything stands there.
    pub fn attacks_square(&self, pos: &Position, target: Square) -> bool {
        match self.kind {
            PieceType::Pawn => {
                let forward = self.alliance.direction();
                [forward - 1, forward + 1]
                    .into_iter()
                    .any(|offset| geometry::step(self.square, offset) == Some(target))
            }
            PieceType::Knight => KNIGHT_OFFSETS
                .iter()
                .any(|&offset| geometry::step(self.square, offset) == Some(target)),
            PieceType::King => KING_OFFSETS
                .iter()
                .any(|&offset| geometry::step(self.square, offset) == Some(target)),
            PieceType::Bishop => ray_reaches(self.square, pos, &BISHOP_VECTORS, target),
            PieceType::Rook => ray_reaches(self.square, pos, &ROOK_VECTORS, target),
            PieceType::Queen => ray_reaches(self.square, pos, &QUEEN_VECTORS, target),
        }
    }
}

// ---------------------------------------------------------------------------
// Sliding pieces (bishop, rook, queen)
// ---------------------------------------------------------------------------

fn sliding_moves(piece: &Piece, pos: &Position, vectors: &[i8], moves: &mut Vec<Move>) {
    for &vector in vectors {
        let mut current = piece.square;
        while let Some(next) = geometry::step(current, vector) {
            match pos.piece_at(next) {
                None => moves.push(Move::normal(*piece, next)),
                Some(occupant) => {
                    if occupant.alliance != piece.alliance {
                        moves.push(Move::capture(*piece, next, occupant));
                    }
                    break;
                }
            }
            current = next;
        }
    }
}

fn ray_reaches(from: Square, pos: &Position, vectors: &[i8], target: Square) -> bool {
    vectors.iter().any(|&vector| {
        let mut current = from;
        while let Some(next) = geometry::step(current, vector) {
            if next == target {
                return true;
            }
            if pos.piece_at(next).is_some() {
                return false;
            }
            current = next;
        }
        false
    })
}

// ---------------------------------------------------------------------------
// Stepping pieces (knight, king)
// ---------------------------------------------------------------------------

fn stepping_moves(piece: &Piece, pos: &Position, offsets: &[i8], moves: &mut Vec<Move>) {
    for &offset in offsets {
        let Some(to) = geometry::step(piece.square, offset) else {
            continue;
        };
        match pos.piece_at(to) {
            None => moves.push(Move::normal(*piece, to)),
            Some(occupant) if occupant.alliance != piece.alliance => {
                moves.push(Move::capture(*piece, to, occupant));
            }
            Some(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Castling
// ---------------------------------------------------------------------------

fn castle_moves(king: &Piece, pos: &Position, moves: &mut Vec<Move>) {
    let us = king.alliance;
    let them = us.opponent();
    let rank = us.back_rank();
    let home = Square::from_file_rank(4, rank);

    if !king.first_move || king.square != home {
        return;
    }
    let rights = pos.castling_rights();
    if !rights.can_castle_kingside(us) && !rights.can_castle_queenside(us) {
        return;
    }
    if movegen::is_square_attacked(pos, home, them) {
        return;
    }

    let at = |file: u8| Square::from_file_rank(file, rank);
    let unmoved_rook = |file: u8| {
        pos.piece_at(at(file)).filter(|p| {
            p.kind == PieceType::Rook && p.alliance == us && p.first_move
        })
    };
    let empty = |file: u8| pos.piece_at(at(file)).is_none();
    let safe = |file: u8| !movegen::is_square_attacked(pos, at(file), them);

    if rights.has(CastlingRights::kingside_flag(us))
        && let Some(rook) = unmoved_rook(7)
        && empty(5)
        && empty(6)
        && safe(5)
        && safe(6)
    {
        moves.push(Move::castle(*king, at(6), CastleSide::Kingside, rook, at(5)));
    }

    if rights.has(CastlingRights::queenside_flag(us))
        && let Some(rook) = unmoved_rook(0)
        && empty(1)
        && empty(2)
        && empty(3)
        && safe(3)
        && safe(2)
    {
        moves.push(Move::castle(*king, at(2), CastleSide::Queenside, rook, at(3)));
    }
}

// ---------------------------------------------------------------------------
// Pawns
// ---------------------------------------------------------------------------

fn pawn_moves(pawn: &Piece, pos: &Position, moves: &mut Vec<Move>) {
    let us = pawn.alliance;
    let forward = us.direction();
    let promotes = |to: Square| to.rank() == us.promotion_rank();

    // Pushes.
    if let Some(one) = geometry::step(pawn.square, forward)
        && pos.piece_at(one).is_none()
    {
        if promotes(one) {
            push_promotions(pawn, one, None, moves);
        } else {
            moves.push(Move::normal(*pawn, one));
        }

        if pawn.square.rank() == us.pawn_start_rank()
            && let Some(two) = geometry::step(one, forward)
            && pos.piece_at(two).is_none()
        {
            moves.push(Move::pawn_jump(*pawn, two));
        }
    }

    // Diagonal captures and en passant.
    for offset in [forward - 1, forward + 1] {
        let Some(to) = geometry::step(pawn.square, offset) else {
            continue;
        };
        match pos.piece_at(to) {
            Some(occupant) if occupant.alliance != us => {
                if promotes(to) {
                    push_promotions(pawn, to, Some(occupant), moves);
                } else {
                    moves.push(Move::capture(*pawn, to, occupant));
                }
            }
            Some(_) => {}
            None => {
                if pos.en_passant() == Some(to)
                    && let Some(behind) = geometry::step(to, -forward)
                    && let Some(victim) = pos.piece_at(behind)
                    && victim.kind == PieceType::Pawn
                    && victim.alliance != us
                {
                    moves.push(Move::en_passant(*pawn, to, victim));
                }
            }
        }
    }
}

/// One move per promotable piece type.
fn push_promotions(pawn: &Piece, to: Square, captured: Option<Piece>, moves: &mut Vec<Move>) {
    for kind in PieceType::PROMOTIONS {
        moves.push(Move::promotion(*pawn, to, kind, captured));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::moves::MoveKind;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn moves_of(p: &Position, from: &str) -> Vec<Move> {
        p.piece_at(sq(from)).unwrap().pseudo_legal_moves(p)
    }

    fn targets(moves: &[Move]) -> Vec<String> {
        let mut t: Vec<String> = moves.iter().map(|m| m.to().to_algebraic()).collect();
        t.sort();
        t
    }

    // -------------------------------------------------------------------
    // Sliders
    // -------------------------------------------------------------------

    #[test]
    fn bishop_on_first_column_does_not_wrap() {
        let p = pos("4k3/8/8/8/B7/8/8/4K3 w - - 0 1");
        let moves = moves_of(&p, "a4");
        assert_eq!(
            targets(&moves),
            vec!["b3", "b5", "c2", "c6", "d1", "d7", "e8"]
        );
        assert!(moves.iter().all(|m| m.to().file() > 0));
    }

    #[test]
    fn bishop_on_last_column_does_not_wrap() {
        let p = pos("4k3/8/8/8/7B/8/8/4K3 w - - 0 1");
        let moves = moves_of(&p, "h4");
        assert_eq!(
            targets(&moves),
            vec!["d8", "e1", "e7", "f2", "f6", "g3", "g5"]
        );
    }

    #[test]
    fn bishop_stops_on_capture_and_before_friend() {
        let p = pos("4k3/8/5p2/8/3B4/2P5/8/4K3 w - - 0 1");
        let moves = moves_of(&p, "d4");
        let t = targets(&moves);
        assert!(t.contains(&"f6".to_string()));
        assert!(!t.contains(&"g7".to_string()));
        assert!(!t.contains(&"c3".to_string()));
        assert!(!t.contains(&"b2".to_string()));
        let captures: Vec<_> = moves.iter().filter(|m| m.is_capture()).collect();
        assert_eq!(captures.len(), 1);
        assert_eq!(captures[0].captured().unwrap().square(), sq("f6"));
    }

    #[test]
    fn rook_on_edges_stays_on_its_rank() {
        let p = pos("4k3/8/8/8/R6R/8/8/4K3 w - - 0 1");
        let left = moves_of(&p, "a4");
        assert!(left.iter().all(|m| m.to().file() == 0 || m.to().rank() == 3));
        assert_eq!(left.len(), 6 + 7);
        let right = moves_of(&p, "h4");
        assert_eq!(right.len(), 6 + 7);
    }

    #[test]
    fn queen_in_corner() {
        let p = pos("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1");
        let moves = moves_of(&p, "a1");
        // 7 up the file, 3 along the rank before the king, 7 on the diagonal.
        assert_eq!(moves.len(), 17);
    }

    // -------------------------------------------------------------------
    // Knight / king
    // -------------------------------------------------------------------

    #[test]
    fn knight_in_corner_has_two_moves() {
        let p = pos("4k3/8/8/8/8/8/8/N3K3 w - - 0 1");
        assert_eq!(targets(&moves_of(&p, "a1")), vec!["b3", "c2"]);
    }

    #[test]
    fn knight_on_b_and_g_files() {
        let p = pos("4k3/8/8/8/1N4N1/8/8/4K3 w - - 0 1");
        assert_eq!(
            targets(&moves_of(&p, "b4")),
            vec!["a2", "a6", "c2", "c6", "d3", "d5"]
        );
        assert_eq!(
            targets(&moves_of(&p, "g4")),
            vec!["e3", "e5", "f2", "f6", "h2", "h6"]
        );
    }

    #[test]
    fn knight_jumps_over_pieces() {
        let p = Position::starting();
        assert_eq!(targets(&moves_of(&p, "b1")), vec!["a3", "c3"]);
    }

    #[test]
    fn king_on_edge() {
        let p = pos("4k3/8/8/8/K7/8/8/8 w - - 0 1");
        assert_eq!(
            targets(&moves_of(&p, "a4")),
            vec!["a3", "a5", "b3", "b4", "b5"]
        );
    }

    // -------------------------------------------------------------------
    // Pawns
    // -------------------------------------------------------------------

    #[test]
    fn pawn_push_and_jump() {
        let p = Position::starting();
        let moves = moves_of(&p, "e2");
        assert_eq!(targets(&moves), vec!["e3", "e4"]);
        let jump = moves.iter().find(|m| m.to() == sq("e4")).unwrap();
        assert_eq!(jump.kind(), MoveKind::PawnJump);
    }

    #[test]
    fn pawn_jump_blocked_by_piece_on_fourth_rank() {
        let p = pos("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1");
        assert_eq!(targets(&moves_of(&p, "e2")), vec!["e3"]);
    }

    #[test]
    fn pawn_captures_do_not_wrap() {
        let p = pos("4k3/8/8/8/8/1p5p/P7/4K3 w - - 0 1");
        let moves = moves_of(&p, "a2");
        assert_eq!(targets(&moves), vec!["a3", "a4", "b3"]);
    }

    #[test]
    fn black_pawn_moves_down() {
        let p = pos("4k3/3p4/4P3/8/8/8/8/4K3 b - - 0 1");
        let moves = moves_of(&p, "d7");
        assert_eq!(targets(&moves), vec!["d5", "d6", "e6"]);
    }

    #[test]
    fn pawn_promotion_variants() {
        let p = pos("3r3k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let moves = moves_of(&p, "e7");
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|m| m.promotion_piece().is_some()));
        let captures = moves.iter().filter(|m| m.is_capture()).count();
        assert_eq!(captures, 4);
    }

    #[test]
    fn en_passant_targets_recorded_square_only() {
        let p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let moves = moves_of(&p, "e5");
        let ep = moves
            .iter()
            .find(|m| matches!(m.kind(), MoveKind::EnPassant { .. }))
            .unwrap();
        assert_eq!(ep.to(), sq("d6"));
        assert_eq!(ep.captured().unwrap().square(), sq("d5"));

        let stale = pos("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2");
        assert!(
            !moves_of(&stale, "e5")
                .iter()
                .any(|m| matches!(m.kind(), MoveKind::EnPassant { .. }))
        );
    }

    // -------------------------------------------------------------------
    // Attacks
    // -------------------------------------------------------------------

    #[test]
    fn pawn_attacks_diagonals_not_front() {
        let p = pos("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        let pawn = p.piece_at(sq("e2")).unwrap();
        assert!(pawn.attacks_square(&p, sq("d3")));
        assert!(pawn.attacks_square(&p, sq("f3")));
        assert!(!pawn.attacks_square(&p, sq("e3")));
    }

    #[test]
    fn slider_attack_blocked() {
        let p = pos("4k3/8/8/8/8/8/R1n5/4K3 w - - 0 1");
        let rook = p.piece_at(sq("a2")).unwrap();
        assert!(rook.attacks_square(&p, sq("c2")));
        assert!(!rook.attacks_square(&p, sq("d2")));
        assert!(rook.attacks_square(&p, sq("a8")));
    }

    #[test]
    fn moved_piece_loses_first_move_flag() {
        let pawn = Piece::new(PieceType::Pawn, Alliance::White, sq("e2"));
        let moved = pawn.moved_to(sq("e4"));
        assert!(pawn.is_first_move());
        assert!(!moved.is_first_move());
        assert_eq!(moved.square(), sq("e4"));
        let queen = moved.promoted(PieceType::Queen, sq("e8"));
        assert_eq!(queen.kind(), PieceType::Queen);
        assert_eq!(queen.alliance(), Alliance::White);
    }
}
