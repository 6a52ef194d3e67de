//! WebSocket message types for real-time game events.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::engine::game::Game;
use crate::engine::moves::Move;
use crate::engine::types::GameStatus;

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// Envelope sent from server to subscribed WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WsEvent {
    #[serde(rename = "type")]
    pub event_type: WsEventType,
    #[serde(flatten)]
    pub payload: WsPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WsEventType {
    GameState,
    MoveMade,
    GameOver,
    Error,
    Pong,
    Subscribed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WsPayload {
    GameState(GameStatePayload),
    MoveMade(MoveMadePayload),
    GameOver(GameOverPayload),
    Error(ErrorPayload),
    Pong(PongPayload),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatePayload {
    pub game_id: String,
    pub fen: String,
    pub status: String,
    pub current_player: String,
    pub move_count: usize,
    pub check: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMadePayload {
    pub game_id: String,
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    pub notation: String,
    pub player: String,
    pub fen: String,
    pub status: String,
    pub move_count: usize,
    pub check: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverPayload {
    pub game_id: String,
    pub result: String,
    /// Side that delivered mate; absent on stalemate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    pub fen: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PongPayload {
    /// Server time in Unix milliseconds.
    pub timestamp: i64,
}

// ---------------------------------------------------------------------------
// Client → Server commands
// ---------------------------------------------------------------------------

/// Commands sent from client to server over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsCommand {
    Subscribe {
        game_id: String,
    },
    Unsubscribe {
        game_id: String,
    },
    Ping,
    Move {
        from: String,
        to: String,
        #[serde(default)]
        promotion: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

fn state_payload(game: &Game) -> GameStatePayload {
    GameStatePayload {
        game_id: game.id.clone(),
        fen: game.to_fen(),
        status: game.status().as_str().to_string(),
        current_player: game.side_to_move().to_string(),
        move_count: game.move_history().len(),
        check: game.status() == GameStatus::Check,
    }
}

impl WsEvent {
    /// Full snapshot of a game, pushed after undo and on request.
    pub fn game_state(game: &Game) -> Self {
        WsEvent {
            event_type: WsEventType::GameState,
            payload: WsPayload::GameState(state_payload(game)),
        }
    }

    /// Snapshot sent to a client right after it joins a game's topic.
    pub fn subscribed(game: &Game) -> Self {
        WsEvent {
            event_type: WsEventType::Subscribed,
            payload: WsPayload::GameState(state_payload(game)),
        }
    }

    /// `mv` has just been played in `game`.
    pub fn move_made(game: &Game, mv: &Move) -> Self {
        let status = game.status();
        WsEvent {
            event_type: WsEventType::MoveMade,
            payload: WsPayload::MoveMade(MoveMadePayload {
                game_id: game.id.clone(),
                from: mv.from().to_algebraic(),
                to: mv.to().to_algebraic(),
                promotion: mv.promotion_piece().map(|pt| pt.letter().to_string()),
                notation: mv.to_string(),
                player: mv.moved_piece().alliance().to_string(),
                fen: game.to_fen(),
                status: status.as_str().to_string(),
                move_count: game.move_history().len(),
                check: status == GameStatus::Check,
            }),
        }
    }

    /// Terminal event; `None` when the game is still running.
    pub fn game_over(game: &Game) -> Option<Self> {
        let status = game.status();
        if !status.is_game_over() {
            return None;
        }
        let winner = match status {
            GameStatus::Checkmate => Some(game.side_to_move().opponent().to_string()),
            _ => None,
        };
        Some(WsEvent {
            event_type: WsEventType::GameOver,
            payload: WsPayload::GameOver(GameOverPayload {
                game_id: game.id.clone(),
                result: status.as_str().to_string(),
                winner,
                fen: game.to_fen(),
            }),
        })
    }

    /// Everything subscribers should see once `mv` lands: the move itself
    /// and, if it ended the game, the terminal event.
    pub fn after_move(game: &Game, mv: &Move) -> Vec<Self> {
        std::iter::once(Self::move_made(game, mv))
            .chain(Self::game_over(game))
            .collect()
    }

    pub fn error(message: &str) -> Self {
        WsEvent {
            event_type: WsEventType::Error,
            payload: WsPayload::Error(ErrorPayload {
                message: message.to_string(),
            }),
        }
    }

    pub fn pong() -> Self {
        WsEvent {
            event_type: WsEventType::Pong,
            payload: WsPayload::Pong(PongPayload {
                timestamp: Utc::now().timestamp_millis(),
            }),
        }
    }

    /// Serialize to JSON text for sending over WebSocket.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::moves::MoveRequest;

    fn parse(evt: &WsEvent) -> serde_json::Value {
        serde_json::from_str(&evt.to_json()).unwrap()
    }

    fn play(game: &mut Game, notation: &str) -> Move {
        let req: MoveRequest = notation.parse().unwrap();
        game.play_request(&req).unwrap()
    }

    #[test]
    fn game_state_event_serializes() {
        let game = Game::new();
        let parsed = parse(&WsEvent::game_state(&game));
        assert_eq!(parsed["type"], "game_state");
        assert_eq!(parsed["gameId"], game.id.as_str());
        assert_eq!(parsed["currentPlayer"], "white");
        assert_eq!(parsed["status"], "ongoing");
        assert_eq!(parsed["moveCount"], 0);
    }

    #[test]
    fn subscribed_event_carries_snapshot() {
        let game = Game::new();
        let parsed = parse(&WsEvent::subscribed(&game));
        assert_eq!(parsed["type"], "subscribed");
        assert_eq!(parsed["fen"], game.to_fen());
    }

    #[test]
    fn move_made_event_serializes() {
        let mut game = Game::new();
        let mv = play(&mut game, "e2e4");
        let parsed = parse(&WsEvent::move_made(&game, &mv));
        assert_eq!(parsed["type"], "move_made");
        assert_eq!(parsed["from"], "e2");
        assert_eq!(parsed["to"], "e4");
        assert_eq!(parsed["notation"], "e2e4");
        assert_eq!(parsed["player"], "white");
        assert_eq!(parsed["currentPlayer"], serde_json::Value::Null);
        assert!(parsed.get("promotion").is_none());
    }

    #[test]
    fn move_made_promotion_uses_descriptor_letter() {
        let mut game = Game::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let mv = play(&mut game, "e7e8r");
        let parsed = parse(&WsEvent::move_made(&game, &mv));
        assert_eq!(parsed["promotion"], "r");
        assert_eq!(parsed["notation"], "e7e8r");
    }

    #[test]
    fn game_over_only_when_finished() {
        let mut game = Game::new();
        assert!(WsEvent::game_over(&game).is_none());
        for m in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            play(&mut game, m);
        }
        let parsed = parse(&WsEvent::game_over(&game).unwrap());
        assert_eq!(parsed["type"], "game_over");
        assert_eq!(parsed["result"], "checkmate");
        assert_eq!(parsed["winner"], "black");

        let last = game.last_move().unwrap().mv;
        let events = WsEvent::after_move(&game, &last);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, WsEventType::MoveMade);
        assert_eq!(events[1].event_type, WsEventType::GameOver);
    }

    #[test]
    fn stalemate_has_no_winner() {
        let game = Game::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
        let parsed = parse(&WsEvent::game_over(&game).unwrap());
        assert_eq!(parsed["result"], "stalemate");
        assert!(parsed.get("winner").is_none());
    }

    #[test]
    fn error_event_serializes() {
        let parsed = parse(&WsEvent::error("something went wrong"));
        assert_eq!(parsed["type"], "error");
        assert_eq!(parsed["message"], "something went wrong");
    }

    #[test]
    fn pong_event_serializes() {
        let parsed = parse(&WsEvent::pong());
        assert_eq!(parsed["type"], "pong");
        assert!(parsed["timestamp"].is_number());
    }

    #[test]
    fn ws_command_subscribe_deserializes() {
        let json = r#"{"type":"subscribe","game_id":"g1"}"#;
        let cmd: WsCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, WsCommand::Subscribe { game_id } if game_id == "g1"));
    }

    #[test]
    fn ws_command_ping_deserializes() {
        let cmd: WsCommand = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(cmd, WsCommand::Ping));
    }

    #[test]
    fn ws_command_move_deserializes() {
        let cmd: WsCommand =
            serde_json::from_str(r#"{"type":"move","from":"e7","to":"e8","promotion":"q"}"#)
                .unwrap();
        match cmd {
            WsCommand::Move {
                from,
                to,
                promotion,
            } => {
                assert_eq!((from.as_str(), to.as_str()), ("e7", "e8"));
                assert_eq!(promotion.as_deref(), Some("q"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let plain: WsCommand =
            serde_json::from_str(r#"{"type":"move","from":"e2","to":"e4"}"#).unwrap();
        assert!(matches!(plain, WsCommand::Move { promotion: None, .. }));
    }
}
