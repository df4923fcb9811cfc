// Registry of live player channels and best-effort fan-out.

use crate::use_cases::{CloseReason, ServerEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, warn};

/// Socket-side half of a registered channel.
///
/// The connection task drains `events` into its socket and stops as soon as
/// `close_rx` carries a reason.
#[derive(Debug)]
pub struct ChannelHandle {
    /// Ownership token; only the current owner can unregister the slot.
    pub token: u64,
    pub events: mpsc::Receiver<Arc<ServerEvent>>,
    pub close_rx: watch::Receiver<Option<CloseReason>>,
}

#[derive(Debug)]
struct ChannelEntry {
    token: u64,
    events_tx: mpsc::Sender<Arc<ServerEvent>>,
    close_tx: watch::Sender<Option<CloseReason>>,
}

impl ChannelEntry {
    fn close(&self, reason: CloseReason) {
        // The receiver may already be gone if the socket task exited first.
        let _ = self.close_tx.send(Some(reason));
    }
}

/// Delivery summary for one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Players whose channel failed and was removed during this broadcast.
    pub dropped: Vec<String>,
}

/// Tracks at most one active channel per player.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Outbound queue depth per channel before it counts as stalled.
    queue_capacity: usize,
    channels: Mutex<HashMap<String, ChannelEntry>>,
    next_token: AtomicU64,
}

impl ConnectionManager {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
            channels: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Registers a fresh channel for `player_id`, closing any previous one.
    pub async fn connect(&self, player_id: &str) -> ChannelHandle {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (events_tx, events) = mpsc::channel(self.queue_capacity);
        let (close_tx, close_rx) = watch::channel(None);

        let mut channels = self.channels.lock().await;
        let previous = channels.insert(
            player_id.to_string(),
            ChannelEntry {
                token,
                events_tx,
                close_tx,
            },
        );
        if let Some(previous) = previous {
            previous.close(CloseReason::Replaced);
            info!(player_id, "previous connection replaced");
        }
        debug!(player_id, token, active = channels.len(), "channel connected");

        ChannelHandle {
            token,
            events,
            close_rx,
        }
    }

    /// Removes the channel if `token` still owns the player's slot.
    pub async fn disconnect(&self, player_id: &str, token: u64) -> bool {
        let mut channels = self.channels.lock().await;
        let owns_slot = channels
            .get(player_id)
            .is_some_and(|entry| entry.token == token);
        if !owns_slot {
            return false;
        }

        channels.remove(player_id);
        if channels.is_empty() {
            info!("no active connections");
        }
        true
    }

    /// Queues `event` on every active channel.
    ///
    /// Never waits on a socket: a full or closed queue marks that channel as
    /// failed and removes it, and delivery to the rest continues.
    pub async fn broadcast(&self, event: ServerEvent) -> BroadcastReport {
        let event = Arc::new(event);
        let mut report = BroadcastReport::default();
        let mut channels = self.channels.lock().await;

        channels.retain(|player_id, entry| {
            match entry.events_tx.try_send(event.clone()) {
                Ok(()) => {
                    report.delivered += 1;
                    true
                }
                Err(err) => {
                    let stalled = matches!(err, mpsc::error::TrySendError::Full(_));
                    warn!(player_id = %player_id, stalled, "dropping channel after failed delivery");
                    entry.close(CloseReason::Failed);
                    report.dropped.push(player_id.clone());
                    false
                }
            }
        });

        report
    }

    /// Queues `event` for a single player; same failure policy as `broadcast`.
    pub async fn send_to(&self, player_id: &str, event: ServerEvent) -> bool {
        let mut channels = self.channels.lock().await;
        let Some(entry) = channels.get(player_id) else {
            return false;
        };

        if entry.events_tx.try_send(Arc::new(event)).is_ok() {
            return true;
        }
        warn!(player_id, "dropping channel after failed delivery");
        entry.close(CloseReason::Failed);
        channels.remove(player_id);
        false
    }

    /// Closes and removes every channel, returning how many were active.
    pub async fn disconnect_all(&self) -> usize {
        let mut channels = self.channels.lock().await;
        let count = channels.len();
        for (_, entry) in channels.drain() {
            entry.close(CloseReason::Reset);
        }
        info!(count, "all connections closed");
        count
    }

    pub async fn active_count(&self) -> usize {
        self.channels.lock().await.len()
    }

    pub async fn is_connected(&self, player_id: &str) -> bool {
        self.channels.lock().await.contains_key(player_id)
    }
}
