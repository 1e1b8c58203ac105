//! # Topic-keyed notification bus.
//!
//! [`Bus`] is the process-wide broadcast facility every registry sits on. It keeps
//! a `topic → [listener]` table and delivers a [`Notification`] to every listener
//! of a topic, inline, in subscription order.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                        Listeners (per topic):
//!   Registry A ──┐                          ┌──► wrapper A1 ──► observer
//!   Registry B ──┼── broadcast(topic) ──► Bus ──► wrapper B1 ──► observer
//!   host code  ──┘                          └──► raw listener
//! ```
//!
//! ## Rules
//! - **Synchronous**: `broadcast()` runs every listener before returning.
//! - **Snapshot delivery**: the listener list is copied and the lock released
//!   before any listener runs; listeners may (un)subscribe freely.
//! - **Identity**: listeners are matched by `Arc` pointer identity on unsubscribe.
//! - **No isolation**: a panicking raw listener unwinds through `broadcast()`.
//!   Registries wrap their observers so this never happens for them.
//! - **No persistence**: a broadcast with no listeners is dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::notification::{Notification, Payload};

/// Raw bus listener.
///
/// This is the host-level contract; most code should go through
/// [`Registry`](crate::Registry) instead, which adds ownership and error isolation.
pub trait Listener: Send + Sync + 'static {
    /// Handles one notification. Called inline from `Bus::broadcast`.
    fn on_notify(&self, notification: &Notification);
}

/// Shared handle to a listener.
pub type ListenerRef = Arc<dyn Listener>;

/// Closure-backed [`Listener`].
pub struct ListenerFn<F> {
    f: F,
}

impl<F> ListenerFn<F>
where
    F: Fn(&Notification) + Send + Sync + 'static,
{
    /// Wraps `f` and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self { f })
    }
}

impl<F> Listener for ListenerFn<F>
where
    F: Fn(&Notification) + Send + Sync + 'static,
{
    fn on_notify(&self, notification: &Notification) {
        (self.f)(notification)
    }
}

#[derive(Default)]
struct Topics {
    table: HashMap<Arc<str>, Vec<ListenerRef>>,
}

/// Cloneable handle to a shared notification bus.
///
/// All clones see the same listener table. Inject one `Bus` into every
/// registry that should share delivery.
#[derive(Clone, Default)]
pub struct Bus {
    topics: Arc<RwLock<Topics>>,
}

impl Bus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `listener` to the end of `topic`'s list.
    ///
    /// Subscribing the same listener twice delivers to it twice.
    pub fn subscribe(&self, topic: &str, listener: ListenerRef) {
        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        match topics.table.get_mut(topic) {
            Some(list) => list.push(listener),
            None => {
                topics.table.insert(Arc::from(topic), vec![listener]);
            }
        }
    }

    /// Removes the first subscription of `listener` on `topic`.
    ///
    /// Returns `false` (and does nothing) if it was not subscribed.
    pub fn unsubscribe(&self, topic: &str, listener: &ListenerRef) -> bool {
        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        let Some(list) = topics.table.get_mut(topic) else {
            return false;
        };
        let Some(idx) = list.iter().position(|l| same_listener(l, listener)) else {
            return false;
        };
        list.remove(idx);
        if list.is_empty() {
            topics.table.remove(topic);
        }
        true
    }

    /// Broadcasts to every listener of `topic` and returns how many were called.
    ///
    /// `subject` and `data` are passed through as-is; `None` stays `None`.
    pub fn broadcast(&self, topic: &str, subject: Option<Payload>, data: Option<Payload>) -> usize {
        let mut notification = Notification::new(topic);
        notification.subject = subject;
        notification.data = data;
        self.publish(&notification)
    }

    /// Delivers an already built notification to the listeners of its topic.
    pub fn publish(&self, notification: &Notification) -> usize {
        let listeners = self.snapshot(&notification.topic);
        for listener in &listeners {
            listener.on_notify(notification);
        }
        listeners.len()
    }

    /// Number of subscriptions on `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        topics.table.get(topic).map_or(0, Vec::len)
    }

    /// True if at least one listener is subscribed to `topic`.
    #[inline]
    pub fn has_listeners(&self, topic: &str) -> bool {
        self.listener_count(topic) > 0
    }

    /// Returns sorted list of topics with at least one listener.
    pub fn topics(&self) -> Vec<String> {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = topics.table.keys().map(|t| t.to_string()).collect();
        names.sort_unstable();
        names
    }

    fn snapshot(&self, topic: &str) -> Vec<ListenerRef> {
        let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
        topics.table.get(topic).cloned().unwrap_or_default()
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus").field("topics", &self.topics()).finish()
    }
}

/// Pointer identity, ignoring vtable metadata.
#[inline]
fn same_listener(a: &ListenerRef, b: &ListenerRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
