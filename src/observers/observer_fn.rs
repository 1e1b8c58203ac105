//! # Function-backed observer (`ObserverFn`)
//!
//! [`ObserverFn`] wraps a closure `F: Fn(&Notification) -> Result<(), ObserverError>`.
//! State shared with the rest of the program goes through `Arc<...>` captured by
//! the closure.
//!
//! ## Identity
//! Registration and removal match observers by the identity of the shared
//! [`ObserverRef`]; keep the handle returned by [`ObserverFn::arc`] to remove it later.
//!
//! ## Example
//! ```rust
//! use observer_service::{Notification, ObserverFn, ObserverRef};
//!
//! let cb: ObserverRef = ObserverFn::arc("cb", |n: &Notification| {
//!     println!("got {:?}", n.data_str());
//!     Ok(())
//! });
//!
//! assert_eq!(cb.name(), "cb");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::ObserverError;
use crate::events::Notification;
use crate::observers::observer::Observe;

/// Shared handle to an observer (`Arc<dyn Observe>`).
pub type ObserverRef = Arc<dyn Observe>;

/// Function-backed observer implementation.
#[derive(Debug)]
pub struct ObserverFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ObserverFn<F>
where
    F: Fn(&Notification) -> Result<(), ObserverError> + Send + Sync + 'static,
{
    /// Creates a new function-backed observer.
    ///
    /// Prefer [`ObserverFn::arc`] when you immediately need an [`ObserverRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the observer and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Observe for ObserverFn<F>
where
    F: Fn(&Notification) -> Result<(), ObserverError> + Send + Sync + 'static,
{
    fn observe(&self, n: &Notification) -> Result<(), ObserverError> {
        (self.f)(n)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Pointer identity, ignoring vtable metadata.
#[inline]
pub(crate) fn same_observer(a: &ObserverRef, b: &ObserverRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_per_handle() {
        let a: ObserverRef = ObserverFn::arc("a", |_n: &Notification| Ok(()));
        let b: ObserverRef = ObserverFn::arc("a", |_n: &Notification| Ok(()));
        assert!(same_observer(&a, &Arc::clone(&a)));
        assert!(!same_observer(&a, &b));
    }

    #[test]
    fn test_closure_result_is_returned() {
        let bad = ObserverFn::new("bad", |_n: &Notification| Err(ObserverError::new("foo")));
        let err = bad.observe(&Notification::new("narg")).unwrap_err();
        assert_eq!(err.message(), "foo");
        assert_eq!(bad.name(), "bad");
    }
}
