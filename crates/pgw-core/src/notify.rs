// ── Notification queue ──
//
// Ephemeral operator messages. Each one lives for a fixed TTL on the
// tokio clock (so tests can advance it) or until dismissed. New messages
// are also broadcast for renderers that want to react immediately.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;

const BROADCAST_CAPACITY: usize = 64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

pub struct NotificationQueue {
    ttl: Duration,
    next_id: AtomicU64,
    entries: Mutex<VecDeque<Notification>>,
    tx: broadcast::Sender<Notification>,
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            ttl,
            next_id: AtomicU64::new(1),
            entries: Mutex::new(VecDeque::new()),
            tx,
        }
    }

    /// Append a message and return its id.
    pub fn push(&self, severity: Severity, message: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            severity,
            message: message.into(),
            created_at: Utc::now(),
            expires_at: Instant::now() + self.ttl,
        };
        debug!(id, %severity, message = %notification.message, "notification");

        {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.retain(|n| !n.is_expired());
            entries.push_back(notification.clone());
        }
        // No receivers is fine.
        let _ = self.tx.send(notification);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(Severity::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(Severity::Warning, message)
    }

    pub fn danger(&self, message: impl Into<String>) -> u64 {
        self.push(Severity::Danger, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(Severity::Info, message)
    }

    /// Unexpired messages in arrival order.
    pub fn active(&self) -> Vec<Notification> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|n| !n.is_expired());
        entries.iter().cloned().collect()
    }

    /// Remove a message early. Returns whether it was still present.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expires_after_ttl() {
        let queue = NotificationQueue::new(Duration::from_millis(3500));
        queue.success("first");
        tokio::time::advance(Duration::from_millis(2000)).await;
        queue.warning("second");

        let messages: Vec<_> = queue.active().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, ["first", "second"]);

        tokio::time::advance(Duration::from_millis(1600)).await;
        let messages: Vec<_> = queue.active().into_iter().map(|n| n.message).collect();
        assert_eq!(messages, ["second"]);

        tokio::time::advance(Duration::from_millis(2000)).await;
        assert!(queue.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_removes_early() {
        let queue = NotificationQueue::new(Duration::from_secs(10));
        let a = queue.info("a");
        let b = queue.danger("b");
        assert!(queue.dismiss(a));
        assert!(!queue.dismiss(a));
        let ids: Vec<_> = queue.active().iter().map(|n| n.id).collect();
        assert_eq!(ids, [b]);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_every_push() {
        let queue = NotificationQueue::new(Duration::from_millis(1));
        let mut rx = queue.subscribe();
        queue.success("one");
        tokio::time::advance(Duration::from_millis(5)).await;
        queue.danger("two");

        let first = rx.recv().await.map(|n| n.message).unwrap_or_default();
        let second = rx.recv().await.map(|n| (n.severity, n.message));
        assert_eq!(first, "one");
        assert_eq!(second.ok(), Some((Severity::Danger, "two".to_owned())));
    }
}
