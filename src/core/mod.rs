//! Core: registries and the loader that scopes them.
//!
//! Public API from this module is [`Registry`], [`Loader`], [`LoaderBuilder`]
//! and [`Config`].
//!
//! Internal modules:
//! - [`wrapper`]: per-registration bus listener that contains observer failures;
//! - [`registry`]: owned `(topic, observer)` bookkeeping and bulk unload;
//! - [`loader`]: module instance running unload hooks once, optionally on a
//!   termination signal (`signals` feature).

mod builder;
mod config;
mod loader;
mod registry;
mod wrapper;

pub use builder::LoaderBuilder;
pub use config::Config;
pub use loader::Loader;
pub use registry::Registry;
