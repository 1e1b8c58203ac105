//! # observer-service
//!
//! **observer-service** is a small, scoped observer registry on top of a shared,
//! topic-keyed notification bus.
//!
//! Modules observe topics through a [`Registry`]. The registry remembers what it
//! subscribed, so unloading the owning module removes exactly its own observers,
//! and it contains observer failures so one broken callback never disturbs a
//! broadcast to the others.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐
//!     │   Loader A   │   │   Loader B   │        (one per module instance)
//!     └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐
//!     │  Registry A  │   │  Registry B  │        add / remove / notify / unload
//!     └──────┬───────┘   └──────┬───────┘
//!            │ Wrapper per      │ Wrapper per
//!            │ registration     │ registration
//!            ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                  Bus (topic → [listener], shared)                 │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼  broadcast(topic, subject, data)
//!                     Wrapper::on_notify ──► Observe::observe
//!                                │
//!                                └─ Err / panic ──► LogSink (formatted diagnostic)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Registration: Unregistered ──add──► Active ──remove / unload──► Unregistered
//!
//! Loader::unload()
//!   ├─► hooks, newest first (Registry::unload per handed-out registry, user hooks)
//!   └─► cancel loader token
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Bus**           | Synchronous topic broadcast shared across registries.        | [`Bus`], [`Listener`], [`Notification`]   |
//! | **Observers**     | Callbacks receiving subject/data payloads.                   | [`Observe`], [`ObserverFn`], [`Payload`]  |
//! | **Registry**      | Owned subscriptions, bulk unload, failure isolation.         | [`Registry`]                              |
//! | **Lifecycle**     | Module scope running unload hooks exactly once.              | [`Loader`], [`LoaderBuilder`]             |
//! | **Diagnostics**   | Where contained failures are written.                        | [`LogSink`], [`TracingSink`], [`PlainTextConsole`] |
//! | **Errors**        | Typed registration and observer errors.                      | [`RegistryError`], [`ObserverError`]      |
//! | **Configuration** | Program identity and diagnostic settings.                    | [`Config`]                                |
//!
//! ## Optional features
//! - `signals`: [`Loader::unload_on_shutdown_signal`] unloads on SIGINT/SIGTERM/SIGQUIT.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use observer_service::{Bus, Loader, Notification, ObserverFn, ObserverRef, Payload};
//!
//! let bus = Bus::new();
//! let loader = Loader::builder(bus.clone()).build();
//! let observers = loader.registry();
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let c = Arc::clone(&calls);
//! let cb: ObserverRef = ObserverFn::arc("cb", move |n: &Notification| {
//!     assert_eq!(n.data_str(), Some("some data"));
//!     c.fetch_add(1, Ordering::SeqCst);
//!     Ok(())
//! });
//!
//! observers.add("blarg", cb.clone())?;
//! observers.notify("blarg", None, Some(Payload::text("some data")));
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//!
//! loader.unload();
//! bus.broadcast("blarg", None, Some(Payload::text("some data")));
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! # Ok::<(), observer_service::RegistryError>(())
//! ```
mod console;
mod core;
mod error;
mod events;
mod observers;

// ---- Public re-exports ----

pub use console::{Failure, LogSink, PlainTextConsole, TracingSink, format_exception};
pub use crate::core::{Config, Loader, LoaderBuilder, Registry};
pub use error::{ObserverError, RegistryError};
pub use events::{Bus, Listener, ListenerFn, ListenerRef, Notification, Payload};
pub use observers::{Observe, ObserverFn, ObserverRef};
