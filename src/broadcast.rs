//! # broadcast
//!
//! **Market Broadcaster** — the registry of live WebSocket subscribers and
//! the fan-out that pushes each tick frame to all of them.
//!
//! One producer task serializes a frame per broadcast interval; every
//! subscriber owns an unbounded mpsc channel drained by its own socket loop.
//! Delivery failure (the subscriber's receiver is gone) marks that subscriber
//! dead; dead subscribers are collected during the pass and removed after it,
//! so the active set is never mutated while it is being iterated and one bad
//! connection never blocks delivery to the rest.

use std::collections::HashMap;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

// ─── MarketBroadcaster ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MarketBroadcaster {
    subscribers: RwLock<HashMap<Uuid, UnboundedSender<String>>>,
}

impl MarketBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.  The returned receiver is the subscriber's
    /// half of the channel; dropping it is how a dead connection eventually
    /// surfaces as a failed send.
    pub async fn connect(&self) -> (Uuid, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, tx);
        debug!(subscriber = %id, total = subscribers.len(), "Subscriber connected");

        (id, rx)
    }

    /// Remove a subscriber.  Idempotent: unknown or already-removed ids are
    /// a no-op, never an error.
    pub async fn disconnect(&self, id: Uuid) {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.remove(&id).is_some() {
            debug!(subscriber = %id, total = subscribers.len(), "Subscriber disconnected");
        }
    }

    /// Fan one message out to every connected subscriber.
    ///
    /// Returns the number of successful deliveries.  Subscribers whose send
    /// fails are dropped from the active set after the pass completes.
    pub async fn broadcast(&self, message: &str) -> usize {
        let mut dead: Vec<Uuid> = Vec::new();
        let mut delivered = 0;

        {
            let subscribers = self.subscribers.read().await;
            for (&id, tx) in subscribers.iter() {
                if tx.send(message.to_string()).is_ok() {
                    delivered += 1;
                } else {
                    dead.push(id);
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &dead {
                subscribers.remove(id);
            }
            debug!(removed = dead.len(), total = subscribers.len(), "Pruned dead subscribers");
        }

        delivered
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let broadcaster = MarketBroadcaster::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (_, rx) = broadcaster.connect().await;
            receivers.push(rx);
        }

        let delivered = broadcaster.broadcast("tick-1").await;
        assert_eq!(delivered, 3);
        for rx in &mut receivers {
            assert_eq!(rx.recv().await.unwrap(), "tick-1");
        }
    }

    #[tokio::test]
    async fn failed_subscriber_is_pruned_without_disturbing_others() {
        let broadcaster = MarketBroadcaster::new();
        let (_, mut rx_a) = broadcaster.connect().await;
        let (_, rx_b) = broadcaster.connect().await;
        let (_, mut rx_c) = broadcaster.connect().await;

        // Subscriber B's receiver goes away — its next send fails.
        drop(rx_b);

        assert_eq!(broadcaster.broadcast("tick-1").await, 2);
        assert_eq!(broadcaster.subscriber_count().await, 2);
        assert_eq!(rx_a.recv().await.unwrap(), "tick-1");
        assert_eq!(rx_c.recv().await.unwrap(), "tick-1");

        // The pruned subscriber stays gone on later passes.
        assert_eq!(broadcaster.broadcast("tick-2").await, 2);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let broadcaster = MarketBroadcaster::new();
        let (id, _rx) = broadcaster.connect().await;

        broadcaster.disconnect(id).await;
        broadcaster.disconnect(id).await;
        broadcaster.disconnect(Uuid::new_v4()).await;
        assert_eq!(broadcaster.subscriber_count().await, 0);
    }
}
