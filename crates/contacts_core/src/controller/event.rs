//! One-shot event delivery from controllers to the presentation layer.
//!
//! # Invariants
//! - The conduit holds at most one undelivered event; a newer one replaces it.
//! - Each event is delivered at most once.

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Single-slot, newest-wins, consumed-once channel.
#[derive(Debug)]
pub struct EventConduit<E> {
    slot: Mutex<Option<E>>,
    ready: Notify,
}

impl<E> Default for EventConduit<E> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Notify::new(),
        }
    }
}

impl<E> EventConduit<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `event`, returning the unconsumed event it replaced, if any.
    pub fn emit(&self, event: E) -> Option<E> {
        let replaced = self.slot.lock().replace(event);
        self.ready.notify_one();
        replaced
    }

    /// Takes the pending event without waiting.
    pub fn try_recv(&self) -> Option<E> {
        self.slot.lock().take()
    }

    /// Waits for the next event and takes it.
    pub async fn recv(&self) -> E {
        loop {
            if let Some(event) = self.try_recv() {
                return event;
            }
            self.ready.notified().await;
        }
    }
}
