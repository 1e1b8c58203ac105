//! Error types used by the registry and by observers.
//!
//! - [`RegistryError`] — registration rejected by a [`Registry`](crate::Registry).
//! - [`ObserverError`] — failure reported by an observer callback.
//!
//! Only `RegistryError` ever reaches a caller. Observer failures are caught by
//! the registry, written to the log sink and swallowed.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::panic::Location;

use thiserror::Error;

/// # Errors returned by registry operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Topic was the empty string.
    #[error("topic must not be empty")]
    EmptyTopic,

    /// Registry was already unloaded; no new subscription may outlive it.
    #[error("registry for '{program}' is unloaded")]
    Unloaded {
        /// Program identity of the owning registry.
        program: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use observer_service::RegistryError;
    ///
    /// assert_eq!(RegistryError::EmptyTopic.as_label(), "registry_empty_topic");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::EmptyTopic => "registry_empty_topic",
            RegistryError::Unloaded { .. } => "registry_unloaded",
        }
    }
}

/// # Failure raised by an observer.
///
/// Carries the message and the source location where it was created; both end up
/// in the diagnostic written to the log sink.
///
/// # Example
/// ```
/// use observer_service::ObserverError;
///
/// let err = ObserverError::new("foo");
/// assert_eq!(err.to_string(), "foo");
/// assert!(err.location().file().ends_with(".rs"));
/// ```
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ObserverError {
    message: Cow<'static, str>,
    location: &'static Location<'static>,
}

impl ObserverError {
    /// Creates an error at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Converts any error, keeping its display text and recording the caller's location.
    #[track_caller]
    pub fn from_error<E: StdError + ?Sized>(err: &E) -> Self {
        Self::new(err.to_string())
    }

    /// Creates an error with an explicit location.
    pub(crate) fn at(message: impl Into<Cow<'static, str>>, location: &'static Location<'static>) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_records_caller_line() {
        let line = line!() + 1;
        let err = ObserverError::new("boom");
        assert_eq!(err.location().line(), line);
        assert_eq!(err.location().file(), file!());
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_from_error_keeps_display() {
        let io = std::io::Error::other("disk gone");
        let err = ObserverError::from_error(&io);
        assert_eq!(err.to_string(), "disk gone");
    }

    #[test]
    fn test_registry_error_labels() {
        let e = RegistryError::Unloaded {
            program: "addon".into(),
        };
        assert_eq!(e.as_label(), "registry_unloaded");
        assert_eq!(e.to_string(), "registry for 'addon' is unloaded");
    }
}
