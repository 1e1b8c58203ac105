//! # Console: where contained observer failures are reported.
//!
//! - [`LogSink`] - destination for formatted diagnostics
//! - [`TracingSink`] - default sink, emits `tracing` error events
//! - [`PlainTextConsole`] - forwards diagnostics to a print function
//! - [`format_exception`] - renders a [`Failure`] into the diagnostic text

mod exception;
mod plain_text;
mod sink;

pub use exception::{Failure, format_exception};
pub use plain_text::PlainTextConsole;
pub use sink::{LogSink, TracingSink};
