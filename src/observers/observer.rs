//! # Observer trait.
//!
//! Provides [`Observe`], the callback contract for everything registered through
//! a [`Registry`](crate::Registry).
//!
//! ## Rules
//! - Observers run inline, inside `notify`/`broadcast`, on the caller's thread.
//! - Returning `Err` (or panicking) is contained by the registry: the failure is
//!   logged and the remaining observers still run.
//! - Observers may add or remove registrations while being notified.
//!
//! ## Example
//! ```rust
//! use observer_service::{Notification, Observe, ObserverError};
//!
//! struct Audit;
//!
//! impl Observe for Audit {
//!     fn observe(&self, n: &Notification) -> Result<(), ObserverError> {
//!         match n.data_str() {
//!             Some(_) => Ok(()),
//!             None => Err(ObserverError::new("audit entry without data")),
//!         }
//!     }
//!
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use crate::error::ObserverError;
use crate::events::Notification;

/// Callback invoked for notifications on the topics it is registered on.
pub trait Observe: Send + Sync + 'static {
    /// Handles a single notification.
    ///
    /// `n.subject` is never `None` when the notification came from
    /// `Registry::notify`; raw `Bus::broadcast` calls may pass no subject.
    fn observe(&self, n: &Notification) -> Result<(), ObserverError>;

    /// Returns the observer name used in diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
