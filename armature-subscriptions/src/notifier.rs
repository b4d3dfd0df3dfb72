//! Event removed notifications
//!
//! Raised when an event key loses its last handler, so transport code can
//! tear down the broker-side binding for that name.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Listener invoked with the event key that became unhandled
pub type EventRemovedListener = Arc<dyn Fn(&str) + Send + Sync>;

/// Handle returned when attaching a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Fan-out of event removed notifications
///
/// Clones share the same listener list and broadcast channel.
#[derive(Clone)]
pub struct EventRemovedNotifier {
    listeners: Arc<RwLock<Vec<(ListenerId, EventRemovedListener)>>>,
    next_id: Arc<AtomicU64>,
    sender: broadcast::Sender<String>,
}

impl EventRemovedNotifier {
    /// Create a notifier with the given broadcast capacity
    pub fn new(channel_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
            sender,
        }
    }

    /// Attach a synchronous listener
    pub fn attach<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Detach a listener, returning whether it was attached
    pub fn detach(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Number of attached listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Receive notifications over a broadcast channel
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    /// Notify every listener and broadcast receiver
    pub fn notify(&self, event_key: &str) {
        // Snapshot so listeners may attach or detach while being called
        let listeners: Vec<EventRemovedListener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(event_key);
        }

        if self.sender.receiver_count() > 0 {
            // Receivers may drop between the check and the send
            let _ = self.sender.send(event_key.to_string());
        }
    }
}

impl Default for EventRemovedNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl fmt::Debug for EventRemovedNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRemovedNotifier")
            .field("listeners", &self.listener_count())
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}
