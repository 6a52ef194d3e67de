//! Position transition: applying a move yields a fresh position.

use crate::engine::board::Position;
use crate::engine::geometry;
use crate::engine::movegen;
use crate::engine::moves::{Move, MoveKind};
use crate::engine::types::{Alliance, ChessError, PieceType};

/// Apply `mv` to `pos`, returning the successor.
///
/// Moves are checked against the legal set first, so a move built for some
/// other position (or one that leaves the mover in check) is rejected with
/// [`ChessError::IllegalMove`] and `pos` is untouched.
pub fn apply(pos: &Position, mv: &Move) -> Result<Position, ChessError> {
    if !movegen::legal_moves(pos).contains(mv) {
        return Err(ChessError::IllegalMove(format!(
            "{mv} is not legal for {} in this position",
            pos.side_to_move()
        )));
    }
    Ok(play_unchecked(pos, mv))
}

/// Build the successor without validating `mv`. Only generator output may be
/// passed here.
pub(crate) fn play_unchecked(pos: &Position, mv: &Move) -> Position {
    let mut next = pos.clone();
    let piece = mv.moved_piece();
    let us = piece.alliance();
    let from = mv.from();
    let to = mv.to();

    next.clear(from);
    match mv.kind() {
        MoveKind::Normal | MoveKind::Capture { .. } | MoveKind::PawnJump => {
            next.place(piece.moved_to(to));
        }
        MoveKind::EnPassant { captured } => {
            next.clear(captured.square());
            next.place(piece.moved_to(to));
        }
        MoveKind::Castle { rook, rook_to, .. } => {
            next.clear(rook.square());
            next.place(rook.moved_to(rook_to));
            next.place(piece.moved_to(to));
        }
        MoveKind::Promotion { to: kind, .. } => {
            next.place(piece.promoted(kind, to));
        }
    }

    next.restrict_castling(from);
    next.restrict_castling(to);

    next.set_en_passant(match mv.kind() {
        MoveKind::PawnJump => geometry::step(from, us.direction()),
        _ => None,
    });

    let halfmove = if piece.kind() == PieceType::Pawn || mv.is_capture() {
        0
    } else {
        pos.halfmove_clock().saturating_add(1)
    };
    let fullmove = match us {
        Alliance::White => pos.fullmove_number(),
        Alliance::Black => pos.fullmove_number().saturating_add(1),
    };
    next.set_clocks(halfmove, fullmove);
    next.set_side_to_move(!us);
    next
}

/// Would playing `mv` leave the mover's own king attacked?
pub(crate) fn leaves_king_attacked(pos: &Position, mv: &Move) -> bool {
    let us = mv.moved_piece().alliance();
    let next = play_unchecked(pos, mv);
    next.king_square(us)
        .is_none_or(|king| movegen::is_square_attacked(&next, king, !us))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{CastlingRights, Square};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn find(p: &Position, from: &str, to: &str) -> Move {
        movegen::legal_moves(p)
            .into_iter()
            .find(|m| m.from() == sq(from) && m.to() == sq(to))
            .unwrap_or_else(|| panic!("{from}{to} not legal"))
    }

    #[test]
    fn apply_does_not_touch_input() {
        let start = Position::starting();
        let snapshot = start.clone();
        let next = apply(&start, &find(&start, "e2", "e4")).unwrap();
        assert_eq!(start, snapshot);
        assert_ne!(next, start);
    }

    #[test]
    fn pawn_jump_sets_en_passant_then_clears() {
        let start = Position::starting();
        let after = apply(&start, &find(&start, "e2", "e4")).unwrap();
        assert_eq!(after.en_passant(), Some(sq("e3")));
        assert_eq!(after.side_to_move(), Alliance::Black);
        assert_eq!(
            after.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
        );

        let reply = apply(&after, &find(&after, "g8", "f6")).unwrap();
        assert_eq!(reply.en_passant(), None);
        assert_eq!(reply.halfmove_clock(), 1);
        assert_eq!(reply.fullmove_number(), 2);
    }

    #[test]
    fn moved_piece_is_no_longer_first_move() {
        let start = Position::starting();
        let after = apply(&start, &find(&start, "g1", "f3")).unwrap();
        let knight = after.piece_at(sq("f3")).unwrap();
        assert!(!knight.is_first_move());
        assert!(after.piece_at(sq("g1")).is_none());
    }

    #[test]
    fn en_passant_removes_jumped_pawn() {
        let p = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let after = apply(&p, &find(&p, "e5", "d6")).unwrap();
        assert!(after.piece_at(sq("d5")).is_none());
        assert!(after.piece_at(sq("e5")).is_none());
        let pawn = after.piece_at(sq("d6")).unwrap();
        assert_eq!(pawn.kind(), PieceType::Pawn);
        assert_eq!(pawn.alliance(), Alliance::White);
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let after = apply(&p, &find(&p, "e1", "g1")).unwrap();
        assert_eq!(after.piece_at(sq("g1")).unwrap().kind(), PieceType::King);
        assert_eq!(after.piece_at(sq("f1")).unwrap().kind(), PieceType::Rook);
        assert!(after.piece_at(sq("h1")).is_none());
        assert!(after.piece_at(sq("e1")).is_none());
        assert_eq!(after.castling_rights().to_fen(), "kq");

        let long = apply(&p, &find(&p, "e1", "c1")).unwrap();
        assert_eq!(long.piece_at(sq("d1")).unwrap().kind(), PieceType::Rook);
        assert!(long.piece_at(sq("a1")).is_none());
    }

    #[test]
    fn capturing_a_rook_clears_its_right() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let after = apply(&p, &find(&p, "a1", "a8")).unwrap();
        assert!(!after.castling_rights().has(CastlingRights::BLACK_QUEENSIDE));
        assert!(!after.castling_rights().has(CastlingRights::WHITE_QUEENSIDE));
        assert!(after.castling_rights().has(CastlingRights::BLACK_KINGSIDE));
        assert_eq!(after.halfmove_clock(), 0);
    }

    #[test]
    fn promotion_replaces_pawn() {
        let p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 5 9");
        let mv = movegen::legal_moves(&p)
            .into_iter()
            .find(|m| m.promotion_piece() == Some(PieceType::Knight))
            .unwrap();
        let after = apply(&p, &mv).unwrap();
        let knight = after.piece_at(sq("e8")).unwrap();
        assert_eq!(knight.kind(), PieceType::Knight);
        assert_eq!(knight.alliance(), Alliance::White);
        assert!(after.piece_at(sq("e7")).is_none());
        assert_eq!(after.halfmove_clock(), 0);
    }

    #[test]
    fn apply_rejects_moves_from_other_positions() {
        let start = Position::starting();
        let after = apply(&start, &find(&start, "e2", "e4")).unwrap();
        let stale = find(&start, "d2", "d4");
        assert!(matches!(
            apply(&after, &stale),
            Err(ChessError::IllegalMove(_))
        ));
    }

    #[test]
    fn pinned_piece_move_leaves_king_attacked() {
        let p = pos("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1");
        let bishop = p.piece_at(sq("e2")).unwrap();
        let pseudo = bishop.pseudo_legal_moves(&p);
        assert!(!pseudo.is_empty());
        assert!(pseudo.iter().all(|m| leaves_king_attacked(&p, m)));
    }
}
