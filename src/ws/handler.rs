//! WebSocket session for one game topic: `/ws/games/{id}`.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use crate::api::state::SharedState;
use crate::engine::moves::MoveRequest;

use super::manager::ClientId;
use super::messages::{WsCommand, WsEvent};

/// GET /ws/games/{id}
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, id, state))
}

async fn handle_socket(socket: WebSocket, game_id: String, state: SharedState) {
    let (mut sink, mut stream) = socket.split();

    // Moves publish under the games write lock, so subscribing under the
    // read lock that produced the snapshot leaves no gap between the two.
    let joined = {
        let games = state.games.read().await;
        match games.get(&game_id) {
            Some(game) => {
                let snapshot = WsEvent::subscribed(game);
                Some((snapshot, state.ws.subscribe(&game_id).await))
            }
            None => None,
        }
    };
    let Some((snapshot, (client_id, mut rx))) = joined else {
        let err = WsEvent::error(&format!("game not found: {game_id}"));
        let _ = sink.send(Message::Text(err.to_json().into())).await;
        let _ = sink.close().await;
        return;
    };

    if sink
        .send(Message::Text(snapshot.to_json().into()))
        .await
        .is_err()
    {
        state.ws.unsubscribe(&game_id, client_id).await;
        return;
    }

    // Outbound: drain this client's queue into the socket. The queue closes
    // when the client unsubscribes or the game is deleted.
    let mut writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sink
                .send(Message::Text(event.to_json().into()))
                .await
                .is_err()
            {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let reader_state = state.clone();
    let reader_gid = game_id.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => {
                    handle_command(&reader_state, &reader_gid, client_id, &text).await;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut writer => { reader.abort(); }
        _ = &mut reader => { writer.abort(); }
    }

    state.ws.unsubscribe(&game_id, client_id).await;
    debug!(game_id, client_id, "session ended");
}

/// Handle one client frame. Replies that concern only the sender go through
/// `send_to`; accepted moves are broadcast to the whole topic.
async fn handle_command(state: &SharedState, game_id: &str, client_id: ClientId, text: &str) {
    let cmd = match serde_json::from_str::<WsCommand>(text) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!(game_id, client_id, "unreadable command: {e}");
            let reply = WsEvent::error(&format!("invalid command: {e}"));
            state.ws.send_to(game_id, client_id, reply).await;
            return;
        }
    };

    match cmd {
        WsCommand::Ping => {
            state.ws.send_to(game_id, client_id, WsEvent::pong()).await;
        }
        WsCommand::Subscribe { game_id: requested } => {
            // The session is bound to the topic in its URL; a subscribe
            // frame just re-requests the snapshot.
            let reply = match state.games.read().await.get(&requested) {
                Some(game) if requested == game_id => WsEvent::subscribed(game),
                Some(_) => WsEvent::error("session is bound to another game"),
                None => WsEvent::error(&format!("game not found: {requested}")),
            };
            state.ws.send_to(game_id, client_id, reply).await;
        }
        WsCommand::Unsubscribe { game_id: requested } => {
            if requested == game_id {
                state.ws.unsubscribe(game_id, client_id).await;
            }
        }
        WsCommand::Move {
            from,
            to,
            promotion,
        } => {
            play_move(state, game_id, client_id, &from, &to, promotion.as_deref()).await;
        }
    }
}

async fn play_move(
    state: &SharedState,
    game_id: &str,
    client_id: ClientId,
    from: &str,
    to: &str,
    promotion: Option<&str>,
) {
    let outcome = {
        let mut games = state.games.write().await;
        match games.get_mut(game_id) {
            None => Err(format!("game not found: {game_id}")),
            Some(game) => match MoveRequest::from_parts(from, to, promotion)
                .and_then(|req| game.play_request(&req))
            {
                Ok(mv) => {
                    for event in WsEvent::after_move(game, &mv) {
                        state.ws.broadcast(game_id, event).await;
                    }
                    Ok(())
                }
                Err(e) => Err(e.to_string()),
            },
        }
    };

    match outcome {
        Ok(()) => debug!(game_id, client_id, from, to, "move accepted over ws"),
        Err(message) => {
            debug!(game_id, client_id, "move rejected: {message}");
            state
                .ws
                .send_to(game_id, client_id, WsEvent::error(&message))
                .await;
        }
    }
}
