//! Legal move generation.
//!
//! Pipeline:
//!   1. Ask every piece of the side to move for its pseudo-legal moves.
//!   2. Filter: play each candidate on a copy and drop it if the mover's king
//!      is attacked afterwards.
//!
//! Pins and check evasions fall out of step 2; nothing is special-cased.

use crate::engine::board::Position;
use crate::engine::moves::Move;
use crate::engine::transition;
use crate::engine::types::{Alliance, GameStatus, Square};

// =========================================================================
// Public API
// =========================================================================

/// Moves for the side to move that may still leave its own king attacked.
pub fn pseudo_legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for piece in pos.pieces_of(pos.side_to_move()) {
        moves.extend(piece.pseudo_legal_moves(pos));
    }
    moves
}

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    pseudo_legal_moves(pos)
        .into_iter()
        .filter(|mv| !transition::leaves_king_attacked(pos, mv))
        .collect()
}

/// Generate all legal moves originating from a specific square.
pub fn legal_moves_from(pos: &Position, from: Square) -> Vec<Move> {
    let Some(piece) = pos.piece_at(from) else {
        return Vec::new();
    };
    if piece.alliance() != pos.side_to_move() {
        return Vec::new();
    }
    piece
        .pseudo_legal_moves(pos)
        .into_iter()
        .filter(|mv| !transition::leaves_king_attacked(pos, mv))
        .collect()
}

/// Is `sq` attacked by any piece of `by`? Stops at the first attacker.
pub fn is_square_attacked(pos: &Position, sq: Square, by: Alliance) -> bool {
    pos.pieces_of(by).any(|piece| piece.attacks_square(pos, sq))
}

/// Classify the position from the side to move's point of view.
pub fn classify(pos: &Position) -> GameStatus {
    let has_moves = !legal_moves(pos).is_empty();
    match (has_moves, pos.is_in_check()) {
        (true, false) => GameStatus::Ongoing,
        (true, true) => GameStatus::Check,
        (false, true) => GameStatus::Checkmate,
        (false, false) => GameStatus::Stalemate,
    }
}

// =========================================================================
// Tests
// =========================================================================
