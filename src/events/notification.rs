//! # Notifications delivered over the bus.
//!
//! A [`Notification`] is what every listener sees for one broadcast: the topic,
//! an optional subject, optional data and some ordering metadata.
//!
//! Subject and data are [`Payload`]s: type-erased, cheaply cloneable values.
//! The bus never inspects them; observers downcast to whatever type they expect.
//!
//! ## Ordering guarantees
//! Each notification has a globally unique sequence number (`seq`) that increases
//! monotonically across all buses in the process.
//!
//! ## Example
//! ```rust
//! use observer_service::{Notification, Payload};
//!
//! let n = Notification::new("blarg")
//!     .with_subject(Payload::new(42u32))
//!     .with_data(Payload::text("some data"));
//!
//! assert_eq!(&*n.topic, "blarg");
//! assert_eq!(n.subject().and_then(|s| s.downcast_ref::<u32>()), Some(&42));
//! assert_eq!(n.data_str(), Some("some data"));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for notification ordering.
static NOTIFICATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Marker stored inside the placeholder payload.
#[derive(Debug)]
struct Placeholder;

/// Type-erased, shareable value used as a notification subject or data.
///
/// Cloning a payload clones the handle, not the value: two clones compare equal
/// under [`Payload::ptr_eq`].
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
}

impl Payload {
    /// Wraps an arbitrary value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
        }
    }

    /// Wraps an already shared value without re-allocating.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self { value }
    }

    /// Wraps a string (read back with [`Payload::as_str`]).
    pub fn text(s: impl Into<String>) -> Self {
        Self::new(s.into())
    }

    /// The non-null stand-in subject used when a caller notifies without one.
    pub fn placeholder() -> Self {
        Self::new(Placeholder)
    }

    /// True if this is a placeholder created by [`Payload::placeholder`].
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.value.is::<Placeholder>()
    }

    /// Returns a reference to the inner value if it is a `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns the inner string for payloads built from `String` or `&'static str`.
    pub fn as_str(&self) -> Option<&str> {
        if let Some(s) = self.value.downcast_ref::<String>() {
            return Some(s.as_str());
        }
        self.value.downcast_ref::<&'static str>().copied()
    }

    /// Identity comparison: true if both handles point at the same value.
    #[inline]
    pub fn ptr_eq(&self, other: &Payload) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder() {
            return f.write_str("Payload(<placeholder>)");
        }
        match self.as_str() {
            Some(s) => f.debug_tuple("Payload").field(&s).finish(),
            None => f.write_str("Payload(<opaque>)"),
        }
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::text(s)
    }
}

/// One broadcast as seen by a listener.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp of the broadcast
/// - `subject` / `data`: optional payloads, passed through untouched
#[derive(Clone, Debug)]
pub struct Notification {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Topic the notification was broadcast on.
    pub topic: Arc<str>,
    /// Subject of the notification, if any.
    pub subject: Option<Payload>,
    /// Accompanying data, if any.
    pub data: Option<Payload>,
}

impl Notification {
    /// Creates a notification for `topic` with the next sequence number.
    pub fn new(topic: impl Into<Arc<str>>) -> Self {
        Self {
            seq: NOTIFICATION_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            topic: topic.into(),
            subject: None,
            data: None,
        }
    }

    /// Attaches a subject.
    #[inline]
    pub fn with_subject(mut self, subject: Payload) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Attaches data.
    #[inline]
    pub fn with_data(mut self, data: impl Into<Payload>) -> Self {
        self.data = Some(data.into());
        self
    }

    #[inline]
    pub fn subject(&self) -> Option<&Payload> {
        self.subject.as_ref()
    }

    #[inline]
    pub fn data(&self) -> Option<&Payload> {
        self.data.as_ref()
    }

    /// Shorthand for `data().and_then(Payload::as_str)`.
    #[inline]
    pub fn data_str(&self) -> Option<&str> {
        self.data.as_ref().and_then(Payload::as_str)
    }
}
