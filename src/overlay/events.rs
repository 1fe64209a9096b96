//! Viewport event subscriptions
//!
//! Resize notifications are broadcast to every registered listener over a
//! crossbeam channel. A listener stays registered until its [`Subscription`]
//! is unsubscribed or dropped.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::debug;

/// New viewport size after a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportEvent {
    pub width: u32,
    pub height: u32,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    senders: HashMap<u64, Sender<ViewportEvent>>,
}

/// Broadcast source of viewport resize events
#[derive(Clone, Default)]
pub struct ViewportEvents {
    listeners: Arc<RwLock<Listeners>>,
}

impl ViewportEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; events arrive on the returned receiver
    pub fn subscribe(&self) -> (Subscription, Receiver<ViewportEvent>) {
        let (tx, rx) = unbounded();
        let mut listeners = self.listeners.write();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.senders.insert(id, tx);
        debug!("Viewport listener {} registered", id);

        let subscription = Subscription {
            id,
            registry: Arc::downgrade(&self.listeners),
            active: true,
        };
        (subscription, rx)
    }

    /// Notify all listeners of a resize, returning how many received it
    pub fn emit_resize(&self, width: u32, height: u32) -> usize {
        let event = ViewportEvent { width, height };
        let listeners = self.listeners.read();
        listeners
            .senders
            .values()
            .filter(|tx| tx.send(event).is_ok())
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().senders.len()
    }
}

/// Registration handle; releasing it deregisters the listener
pub struct Subscription {
    id: u64,
    registry: Weak<RwLock<Listeners>>,
    active: bool,
}

impl Subscription {
    /// Deregister now
    pub fn unsubscribe(mut self) {
        self.release();
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(registry) = self.registry.upgrade() {
            registry.write().senders.remove(&self.id);
            debug!("Viewport listener {} released", self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
