//! # Log sink trait.
//!
//! A [`LogSink`] receives fully formatted, possibly multi-line diagnostics.
//! The registry writes one string per observer failure.
//!
//! Built-in sinks:
//! - [`TracingSink`] (default): forwards each diagnostic as a `tracing` error event.
//! - [`PlainTextConsole`](crate::PlainTextConsole): hands the text to a print function.

/// Destination for formatted diagnostics.
///
/// ### Implementation requirements
/// - Must not panic; a sink is called from inside a broadcast.
/// - Must not call back into the registry that is reporting.
pub trait LogSink: Send + Sync + 'static {
    /// Writes one diagnostic. `text` may span several lines.
    fn write(&self, text: &str);
}

/// Sink that emits every diagnostic through `tracing::error!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl LogSink for TracingSink {
    fn write(&self, text: &str) {
        tracing::error!(target: "observer_service", "{text}");
    }
}
