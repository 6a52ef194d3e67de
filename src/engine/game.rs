//! Game session wrapping a sequence of positions.
//!
//! `Game` owns the current position, the positions that preceded it and the
//! moves played. Positions are values, so undo is a pop rather than a
//! reversal. It is the primary type the API layer interacts with.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::moves::{Move, MoveRequest};
use crate::engine::piece::Piece;
use crate::engine::transition;
use crate::engine::types::{Alliance, ChessError, GameStatus, Square};

// =========================================================================
// MoveRecord
// =========================================================================

/// A recorded move in the game history.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    pub mv: Move,
    /// Status of the position the move produced.
    pub status_after: GameStatus,
}

// =========================================================================
// Game
// =========================================================================

#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    /// Every position before the current one, oldest first.
    history: Vec<Position>,
    move_history: Vec<MoveRecord>,
    status: GameStatus,

    pub id: String,
    pub white_player: String,
    pub black_player: String,
    pub created_at: DateTime<Utc>,

    started_from_fen: bool,
    starting_fen: String,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::starting(), false)
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self::from_position(Position::from_fen(fen)?, true))
    }

    fn from_position(position: Position, started_from_fen: bool) -> Self {
        let status = movegen::classify(&position);
        let starting_fen = position.to_fen();
        Game {
            position,
            history: Vec::new(),
            move_history: Vec::new(),
            status,
            id: Uuid::new_v4().to_string(),
            white_player: "Player".into(),
            black_player: "Player".into(),
            created_at: Utc::now(),
            started_from_fen,
            starting_fen,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn side_to_move(&self) -> Alliance {
        self.position.side_to_move()
    }

    pub fn move_history(&self) -> &[MoveRecord] {
        &self.move_history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.move_history.last()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&self.position)
    }

    pub fn legal_moves_from(&self, sq: Square) -> Vec<Move> {
        movegen::legal_moves_from(&self.position, sq)
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    pub fn started_from_fen(&self) -> bool {
        self.started_from_fen
    }

    pub fn starting_fen(&self) -> &str {
        &self.starting_fen
    }

    /// Pieces of `alliance` captured so far, in capture order.
    pub fn captured(&self, alliance: Alliance) -> Vec<Piece> {
        self.move_history
            .iter()
            .filter_map(|r| r.mv.captured())
            .filter(|p| p.alliance() == alliance)
            .collect()
    }

    // -----------------------------------------------------------------
    // Playing
    // -----------------------------------------------------------------

    /// Play a generated move. Returns the status of the new position.
    ///
    /// Fails with `ChessError::GameOver` once the game has ended and with
    /// `ChessError::IllegalMove` if `mv` is not legal here.
    pub fn make_move(&mut self, mv: Move) -> Result<GameStatus, ChessError> {
        self.ensure_not_over()?;
        let next = transition::apply(&self.position, &mv)?;
        let status = movegen::classify(&next);

        let previous = std::mem::replace(&mut self.position, next);
        self.history.push(previous);
        self.move_history.push(MoveRecord {
            mv,
            status_after: status,
        });
        self.status = status;

        debug!(game_id = %self.id, mv = %mv, status = %status, "move played");
        Ok(status)
    }

    /// Resolve an external descriptor and play it. Returns the move played.
    pub fn play_request(&mut self, request: &MoveRequest) -> Result<Move, ChessError> {
        self.ensure_not_over()?;
        let mv = request.resolve(&self.position)?;
        self.make_move(mv)?;
        Ok(mv)
    }

    fn ensure_not_over(&self) -> Result<(), ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status.to_string()));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Undo
    // -----------------------------------------------------------------

    /// Take back the last move. Returns the move that was undone.
    pub fn undo_move(&mut self) -> Result<Move, ChessError> {
        let (Some(record), Some(previous)) = (self.move_history.pop(), self.history.pop()) else {
            return Err(ChessError::NothingToUndo);
        };
        self.position = previous;
        self.status = movegen::classify(&self.position);
        debug!(game_id = %self.id, mv = %record.mv, "move undone");
        Ok(record.mv)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
