//! # Observers: the callbacks a registry delivers to.
//!
//! - [`Observe`] - trait for implementing an observer
//! - [`ObserverFn`] - closure-backed observer
//! - [`ObserverRef`] - shared reference to an observer (`Arc<dyn Observe>`)

mod observer;
mod observer_fn;

pub use observer::Observe;
pub(crate) use observer_fn::same_observer;
pub use observer_fn::{ObserverFn, ObserverRef};
