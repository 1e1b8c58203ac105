//! # Loader - the module instance that owns registries.
//!
//! A [`Loader`] stands for one loaded module. Everything it hands out is torn
//! down together when it unloads:
//!
//! ```text
//! Loader::registry() ──► Arc<Registry>  (unload wired as a hook, held weakly)
//! Loader::on_unload(f) ─► extra hooks
//!
//! Loader::unload()
//!   ├─► run hooks once, newest first   (Registry::unload, user hooks)
//!   └─► cancel token                    (wakes `unloaded()` waiters)
//! ```
//!
//! ## Rules
//! - `unload()` is idempotent; a hook registered after unload runs immediately.
//! - Registries handed out after unload are already unloaded.
//! - Hooks of dropped registries are pruned on the next `registry()` call.
//! - Dropping the loader unloads it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::console::LogSink;
use crate::core::Config;
use crate::core::builder::LoaderBuilder;
use crate::core::registry::Registry;
use crate::events::Bus;

enum Hook {
    /// Unloads a registry handed out by [`Loader::registry`], if still alive.
    Registry(Weak<Registry>),
    Custom(Box<dyn FnOnce() + Send>),
}

impl Hook {
    fn run(self) {
        match self {
            Hook::Registry(weak) => {
                if let Some(registry) = weak.upgrade() {
                    registry.unload();
                }
            }
            Hook::Custom(f) => f(),
        }
    }

    fn is_dead(&self) -> bool {
        matches!(self, Hook::Registry(weak) if weak.strong_count() == 0)
    }
}

/// Owning module instance with unload hooks.
pub struct Loader {
    cfg: Config,
    bus: Bus,
    sink: Arc<dyn LogSink>,
    /// `None` once unloaded.
    hooks: Mutex<Option<Vec<Hook>>>,
    token: CancellationToken,
}

impl Loader {
    /// Returns a builder for a loader on `bus`.
    pub fn builder(bus: Bus) -> LoaderBuilder {
        LoaderBuilder::new(bus)
    }

    pub(crate) fn new_internal(cfg: Config, bus: Bus, sink: Arc<dyn LogSink>) -> Self {
        Self {
            cfg,
            bus,
            sink,
            hooks: Mutex::new(Some(Vec::new())),
            token: CancellationToken::new(),
        }
    }

    /// Creates a registry whose lifetime is bounded by this loader.
    pub fn registry(&self) -> Arc<Registry> {
        let registry = Arc::new(Registry::new(
            self.bus.clone(),
            &self.cfg,
            Arc::clone(&self.sink),
        ));
        let mut hooks = self.lock_hooks();
        if let Some(list) = hooks.as_mut() {
            list.retain(|h| !h.is_dead());
            list.push(Hook::Registry(Arc::downgrade(&registry)));
            return registry;
        }
        drop(hooks);
        registry.unload();
        registry
    }

    /// Registers `hook` to run once when the loader unloads.
    ///
    /// Runs `hook` immediately if the loader is already unloaded.
    pub fn on_unload(&self, hook: impl FnOnce() + Send + 'static) {
        let mut hooks = self.lock_hooks();
        if let Some(list) = hooks.as_mut() {
            list.push(Hook::Custom(Box::new(hook)));
            return;
        }
        drop(hooks);
        hook();
    }

    /// Runs every unload hook (newest first) and cancels the loader token.
    pub fn unload(&self) {
        let Some(hooks) = self.lock_hooks().take() else {
            return;
        };

        tracing::debug!(program = self.cfg.program_name(), hooks = hooks.len(), "unloading");
        for hook in hooks.into_iter().rev() {
            hook.run();
        }
        self.token.cancel();
    }

    /// True once [`Loader::unload`] has run.
    pub fn is_unloaded(&self) -> bool {
        self.lock_hooks().is_none()
    }

    /// Completes once the loader has unloaded.
    pub fn unloaded(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// A child token cancelled when the loader unloads.
    ///
    /// Hand it to background work that must stop with the module.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Waits for a termination signal (or an explicit unload), then unloads.
    ///
    /// Returns `Err` only if signal registration fails.
    #[cfg(feature = "signals")]
    pub async fn unload_on_shutdown_signal(&self) -> std::io::Result<()> {
        tokio::select! {
            res = termination_signal() => {
                res?;
                tracing::debug!(program = self.cfg.program_name(), "shutdown signal received");
                self.unload();
            }
            _ = self.token.cancelled() => {}
        }
        Ok(())
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn lock_hooks(&self) -> MutexGuard<'_, Option<Vec<Hook>>> {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Loader {
    fn drop(&mut self) {
        self.unload();
    }
}

/// Resolves on the first SIGINT, SIGTERM or SIGQUIT.
#[cfg(all(feature = "signals", unix))]
async fn termination_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut int = signal(SignalKind::interrupt())?;
    let mut term = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;
    tokio::select! {
        _ = int.recv() => {}
        _ = term.recv() => {}
        _ = quit.recv() => {}
    }
    Ok(())
}

/// Resolves on Ctrl-C.
#[cfg(all(feature = "signals", not(unix)))]
async fn termination_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("program", &self.cfg.program_name())
            .field("unloaded", &self.is_unloaded())
            .finish()
    }
}
