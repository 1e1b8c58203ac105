use std::sync::Arc;

use crate::{
    console::{LogSink, TracingSink},
    core::Config,
    events::Bus,
};
use super::loader::Loader;

/// Builder for constructing a [`Loader`] with optional settings.
pub struct LoaderBuilder {
    bus: Bus,
    cfg: Config,
    sink: Option<Arc<dyn LogSink>>,
}

impl LoaderBuilder {
    /// Creates a new builder for a loader on `bus`.
    pub fn new(bus: Bus) -> Self {
        Self {
            bus,
            cfg: Config::default(),
            sink: None,
        }
    }

    /// Sets the configuration shared by every registry of the loader.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets where observer failures are reported.
    ///
    /// Defaults to [`TracingSink`].
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds and returns the Loader instance.
    pub fn build(self) -> Arc<Loader> {
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        Arc::new(Loader::new_internal(self.cfg, self.bus, sink))
    }
}
