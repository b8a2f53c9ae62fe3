use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;

use crate::models::{Notification, NotificationLevel};

const RECENT_CAPACITY: usize = 100;

/// Fan-out of transient notifications to connected admin sessions, with a
/// short backlog so a reconnecting client can catch up.
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
    next_id: AtomicU64,
    recent: Mutex<VecDeque<Notification>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            tx,
            next_id: AtomicU64::new(1),
            recent: Mutex::new(VecDeque::with_capacity(RECENT_CAPACITY)),
        }
    }

    pub fn notify(
        &self,
        level: NotificationLevel,
        message: impl Into<String>,
        booking_id: Option<&str>,
    ) -> Notification {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            level,
            message: message.into(),
            booking_id: booking_id.map(str::to_string),
            created_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        {
            let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
            if recent.len() == RECENT_CAPACITY {
                recent.pop_front();
            }
            recent.push_back(notification.clone());
        }

        // No subscribers is fine
        let _ = self.tx.send(notification.clone());
        notification
    }

    pub fn since(&self, last_id: u64) -> Vec<Notification> {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.id > last_id)
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}
