use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use tracing::{debug, warn};

use crate::engine::game::Game;
use crate::engine::moves::Move;
use crate::engine::types::{ChessError, Square};
use crate::ws::WsEvent;

use super::errors::ApiError;
use super::models::*;
use super::state::SharedState;

// =========================================================================
// Health
// =========================================================================

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let games = state.games.read().await.len();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        games,
        connections: state.ws.total_connections().await,
    })
}

// =========================================================================
// Game lifecycle
// =========================================================================

/// POST /api/games
pub async fn create_game(
    State(state): State<SharedState>,
    Json(input): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), ApiError> {
    let mut game = match input.fen.as_deref() {
        Some(fen) => Game::from_fen(fen).inspect_err(|e| warn!("rejected FEN: {e}"))?,
        None => Game::new(),
    };
    game.white_player = input.white_player.unwrap_or_else(|| "White".into());
    game.black_player = input.black_player.unwrap_or_else(|| "Black".into());

    let mut games = state.games.write().await;
    if games.len() >= state.config.max_games {
        return Err(ApiError::TooManyGames(state.config.max_games));
    }

    let response = game_to_response(&game);
    debug!(game_id = %game.id, "game created");
    games.insert(game.id.clone(), game);

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/games/{id}
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    Ok(Json(game_to_response(game)))
}

/// DELETE /api/games/{id}
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut games = state.games.write().await;
    games
        .remove(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;
    state.ws.close_topic(&id).await;
    drop(games);
    debug!(game_id = %id, "game deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Game deleted".to_string(),
    }))
}

// =========================================================================
// Moves
// =========================================================================

/// GET /api/games/{id}/legal-moves
pub async fn legal_moves(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<LegalMovesQuery>,
) -> Result<Json<LegalMovesResponse>, ApiError> {
    let games = state.games.read().await;
    let game = games
        .get(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let moves: Vec<Move> = match query.from.as_deref() {
        Some(from) => {
            let sq = from.parse::<Square>().map_err(|_| {
                ChessError::MalformedMoveRequest(format!("invalid square '{from}'"))
            })?;
            game.legal_moves_from(sq)
        }
        None => game.legal_moves(),
    };

    let moves: Vec<LegalMoveEntry> = moves.iter().map(LegalMoveEntry::from).collect();
    Ok(Json(LegalMovesResponse {
        count: moves.len(),
        moves,
    }))
}

/// POST /api/games/{id}/moves
pub async fn make_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<MoveInput>,
) -> Result<Json<GameResponse>, ApiError> {
    let request = input.to_request()?;

    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    let mv = game
        .play_request(&request)
        .inspect_err(|e| debug!(game_id = %id, "move rejected: {e}"))?;

    // Published under the games lock so subscribers see moves in play order.
    for event in WsEvent::after_move(game, &mv) {
        state.ws.broadcast(&id, event).await;
    }

    Ok(Json(game_to_response(game)))
}

/// POST /api/games/{id}/undo
pub async fn undo_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let game = games
        .get_mut(&id)
        .ok_or_else(|| ApiError::GameNotFound(id.clone()))?;

    game.undo_move()?;
    state.ws.broadcast(&id, WsEvent::game_state(game)).await;

    Ok(Json(game_to_response(game)))
}

// =========================================================================
// Tests
// =========================================================================
