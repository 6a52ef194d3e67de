use serde::{Deserialize, Serialize};

use crate::engine::game::Game;
use crate::engine::moves::{Move, MoveRequest};
use crate::engine::piece::Piece;
use crate::engine::types::{Alliance, GameStatus, Square};

// ---------------------------------------------------------------------------
// Request models
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub fen: Option<String>,
    pub white_player: Option<String>,
    pub black_player: Option<String>,
}

/// Move body as sent by clients. Fields stay textual so that bad squares
/// surface as a 400 with our error shape rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveInput {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

impl MoveInput {
    pub fn to_request(&self) -> Result<MoveRequest, crate::engine::ChessError> {
        MoveRequest::from_parts(&self.from, &self.to, self.promotion.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesQuery {
    pub from: Option<String>,
}

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime: u64,
    pub games: usize,
    pub connections: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    pub board: Vec<Vec<Option<String>>>,
    pub fen: String,
    pub starting_fen: String,
    pub status: String,
    pub current_player: String,
    pub move_history: Vec<MoveHistoryEntry>,
    pub captured_pieces: CapturedPieces,
    pub check: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move: Option<MoveRequest>,
    pub players: Players,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveHistoryEntry {
    pub from: String,
    pub to: String,
    pub piece: PieceInfo,
    pub captured: Option<PieceInfo>,
    pub promotion: Option<String>,
    pub notation: String,
    pub status: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PieceInfo {
    #[serde(rename = "type")]
    pub piece_type: String,
    pub color: String,
}

impl From<Piece> for PieceInfo {
    fn from(piece: Piece) -> Self {
        PieceInfo {
            piece_type: piece.kind().to_string(),
            color: piece.alliance().to_string(),
        }
    }
}

/// Pieces lost by each side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPieces {
    pub white: Vec<String>,
    pub black: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Players {
    pub white: String,
    pub black: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMoveEntry {
    #[serde(flatten)]
    pub request: MoveRequest,
    pub notation: String,
    pub capture: bool,
}

impl From<&Move> for LegalMoveEntry {
    fn from(mv: &Move) -> Self {
        LegalMoveEntry {
            request: mv.request(),
            notation: mv.to_string(),
            capture: mv.is_capture(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesResponse {
    pub moves: Vec<LegalMoveEntry>,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Build the 8×8 board array for the API response.
/// Row 0 = rank 8 (top), row 7 = rank 1 (bottom).
/// Pieces use FEN letters: uppercase for White ("R"), lowercase for Black ("r").
pub fn board_to_api(game: &Game) -> Vec<Vec<Option<String>>> {
    let pos = game.position();
    (0..8u8)
        .rev()
        .map(|rank| {
            (0..8u8)
                .map(|file| {
                    pos.piece_at(Square::from_file_rank(file, rank))
                        .map(|p| p.to_char().to_string())
                })
                .collect()
        })
        .collect()
}

pub fn captured_pieces(game: &Game) -> CapturedPieces {
    let names = |alliance: Alliance| -> Vec<String> {
        game.captured(alliance)
            .into_iter()
            .map(|p| p.kind().to_string())
            .collect()
    };
    CapturedPieces {
        white: names(Alliance::White),
        black: names(Alliance::Black),
    }
}

pub fn game_to_response(game: &Game) -> GameResponse {
    let status = game.status();
    GameResponse {
        id: game.id.clone(),
        board: board_to_api(game),
        fen: game.to_fen(),
        starting_fen: game.starting_fen().to_string(),
        status: status.as_str().to_string(),
        current_player: game.side_to_move().to_string(),
        move_history: build_move_history(game),
        captured_pieces: captured_pieces(game),
        check: status == GameStatus::Check,
        last_move: game.last_move().map(|rec| rec.mv.request()),
        players: Players {
            white: game.white_player.clone(),
            black: game.black_player.clone(),
        },
        created_at: game.created_at.to_rfc3339(),
    }
}

fn build_move_history(game: &Game) -> Vec<MoveHistoryEntry> {
    game.move_history()
        .iter()
        .map(|rec| MoveHistoryEntry {
            from: rec.mv.from().to_algebraic(),
            to: rec.mv.to().to_algebraic(),
            piece: rec.mv.moved_piece().into(),
            captured: rec.mv.captured().map(PieceInfo::from),
            promotion: rec.mv.promotion_piece().map(|pt| pt.letter().to_string()),
            notation: rec.mv.to_string(),
            status: rec.status_after.as_str().to_string(),
        })
        .collect()
}
