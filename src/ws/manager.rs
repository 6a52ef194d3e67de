//! Per-game topic registry. Each connected client holds one subscription;
//! `broadcast()` fans an event out to a topic, `send_to()` answers one client.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use super::messages::WsEvent;

/// Sending half of a client's outbound queue. The socket task owns the
/// receiving half and drains it into the WebSocket sink.
pub type ClientSender = mpsc::UnboundedSender<WsEvent>;

/// Identifier handed out on subscription, unique for the manager's lifetime.
pub type ClientId = u64;

type Topic = HashMap<ClientId, ClientSender>;

#[derive(Debug)]
pub struct WsManager {
    /// game_id → subscribers
    topics: RwLock<HashMap<String, Topic>>,
    next_id: AtomicU64,
}

impl WsManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Join `game_id`'s topic, returning the client id and its event queue.
    pub async fn subscribe(&self, game_id: &str) -> (ClientId, mpsc::UnboundedReceiver<WsEvent>) {
        let client_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        self.topics
            .write()
            .await
            .entry(game_id.to_string())
            .or_default()
            .insert(client_id, tx);

        debug!(game_id, client_id, "client subscribed");
        (client_id, rx)
    }

    /// Leave a topic. Empty topics are discarded. Unknown ids are ignored.
    pub async fn unsubscribe(&self, game_id: &str, client_id: ClientId) {
        let mut topics = self.topics.write().await;
        let Some(topic) = topics.get_mut(game_id) else {
            return;
        };
        if topic.remove(&client_id).is_some() {
            debug!(game_id, client_id, "client unsubscribed");
        }
        if topic.is_empty() {
            topics.remove(game_id);
        }
    }

    /// Drop every subscription on a topic. The clients' queues close, which
    /// ends their socket sessions.
    pub async fn close_topic(&self, game_id: &str) -> usize {
        let closed = self
            .topics
            .write()
            .await
            .remove(game_id)
            .map_or(0, |topic| topic.len());
        if closed > 0 {
            debug!(game_id, closed, "topic closed");
        }
        closed
    }

    /// Push an event to every subscriber of a game. Clients whose queue is
    /// closed are pruned afterwards.
    pub async fn broadcast(&self, game_id: &str, event: WsEvent) {
        let stale: Vec<ClientId> = {
            let topics = self.topics.read().await;
            let Some(topic) = topics.get(game_id) else {
                return;
            };
            topic
                .iter()
                .filter(|(_, tx)| tx.send(event.clone()).is_err())
                .map(|(&client_id, _)| client_id)
                .collect()
        };

        for client_id in stale {
            warn!(game_id, client_id, "pruning stale client");
            self.unsubscribe(game_id, client_id).await;
        }
    }

    /// Deliver an event to a single client of a game. Returns `false` when
    /// the client is gone, in which case it is dropped from the topic.
    pub async fn send_to(&self, game_id: &str, client_id: ClientId, event: WsEvent) -> bool {
        let delivered = {
            let topics = self.topics.read().await;
            topics
                .get(game_id)
                .and_then(|topic| topic.get(&client_id))
                .is_some_and(|tx| tx.send(event).is_ok())
        };
        if !delivered {
            self.unsubscribe(game_id, client_id).await;
        }
        delivered
    }

    pub async fn subscriber_count(&self, game_id: &str) -> usize {
        self.topics.read().await.get(game_id).map_or(0, Topic::len)
    }

    /// Subscriptions across all topics.
    pub async fn total_connections(&self) -> usize {
        self.topics.read().await.values().map(Topic::len).sum()
    }

    /// Games with at least one subscriber.
    pub async fn active_games(&self) -> Vec<String> {
        self.topics.read().await.keys().cloned().collect()
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}
