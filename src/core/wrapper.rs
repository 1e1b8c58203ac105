//! # Isolation wrapper around a registered observer.
//!
//! Every `Registry::add` subscribes one [`Wrapper`] to the bus. The wrapper is what
//! the bus actually calls; it forwards to the user observer and contains failures.
//!
//! ```text
//! Bus::broadcast ──► Wrapper::on_notify
//!                      ├─ inactive?          → skip
//!                      ├─ observe() Ok       → done
//!                      ├─ observe() Err(e)   → Reporter::report(e)
//!                      └─ panic (caught)     → Reporter::report(panic text @ add site)
//! ```
//!
//! Nothing escapes `on_notify`: the bus and sibling observers never see a failure.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe, Location};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::console::{Failure, LogSink, format_exception};
use crate::core::Config;
use crate::error::ObserverError;
use crate::events::{Listener, Notification};
use crate::observers::ObserverRef;

/// Formats contained failures and hands them to the sink.
pub(crate) struct Reporter {
    program: Box<str>,
    traceback: bool,
    sink: Arc<dyn LogSink>,
}

impl Reporter {
    pub(crate) fn new(cfg: &Config, sink: Arc<dyn LogSink>) -> Self {
        Self {
            program: cfg.program_name().into(),
            traceback: cfg.traceback,
            sink,
        }
    }

    pub(crate) fn program(&self) -> &str {
        &self.program
    }

    fn report(&self, observer: &str, err: &ObserverError) {
        let failure = Failure {
            observer,
            message: err.message(),
            location: err.location(),
        };
        self.sink
            .write(&format_exception(&self.program, &failure, self.traceback));
    }
}

/// Bus listener that owns one registration's delivery.
pub(crate) struct Wrapper {
    observer: ObserverRef,
    active: AtomicBool,
    added_at: &'static Location<'static>,
    reporter: Arc<Reporter>,
}

impl Wrapper {
    pub(crate) fn new(
        observer: ObserverRef,
        added_at: &'static Location<'static>,
        reporter: Arc<Reporter>,
    ) -> Self {
        Self {
            observer,
            active: AtomicBool::new(true),
            added_at,
            reporter,
        }
    }

    /// Stops delivery, including for broadcasts already in flight.
    #[inline]
    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Listener for Wrapper {
    fn on_notify(&self, n: &Notification) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.observer.observe(n)));
        let err = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err,
            Err(payload) => ObserverError::at(panic_message(&*payload), self.added_at),
        };

        tracing::debug!(
            topic = %n.topic,
            observer = self.observer.name(),
            error = err.message(),
            "observer failed"
        );
        self.reporter.report(self.observer.name(), &err);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "observer panicked".to_string()
}
