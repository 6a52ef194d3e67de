pub mod board;
pub mod game;
pub mod geometry;
pub mod movegen;
pub mod moves;
pub mod piece;
pub mod transition;
pub mod types;

pub use board::Position;
pub use game::Game;
pub use movegen::{classify, legal_moves, legal_moves_from};
pub use moves::{CastleSide, Move, MoveKind, MoveRequest};
pub use piece::Piece;
pub use transition::apply;
pub use types::*;

/// The standard chess starting position.
pub fn initial_position() -> Position {
    Position::starting()
}
