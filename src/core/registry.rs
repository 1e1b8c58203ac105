//! # Observer registry - owned subscriptions on a shared bus.
//!
//! A [`Registry`] is the façade a module uses to observe topics. It remembers
//! every `(topic, observer)` it subscribed so that one `unload()` removes exactly
//! those subscriptions and nothing registered by anyone else on the same bus.
//!
//! ## Architecture
//! ```text
//! Registry::add(topic, observer)
//!     ├─► Wrapper(observer)              (error isolation)
//!     ├─► Bus::subscribe(topic, wrapper)
//!     └─► book[topic].push(registration)
//!
//! Registry::remove(topic, observer) ─► every match: deactivate + Bus::unsubscribe
//! Registry::unload()                ─► every registration: deactivate + Bus::unsubscribe
//! Registry::notify(topic, s, d)     ─► Bus::broadcast(topic, s or placeholder, d)
//! ```
//!
//! ## Rules
//! - A registration is in the book **iff** its wrapper is subscribed on the bus;
//!   both change under the book lock.
//! - No dedup: adding the same observer twice delivers twice; `remove` drops all.
//! - `remove` / `unload` are idempotent and never fail.
//! - After `unload`, `add` is rejected with [`RegistryError::Unloaded`].
//! - Dropping the registry unloads it.

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::console::{LogSink, TracingSink};
use crate::core::Config;
use crate::core::wrapper::{Reporter, Wrapper};
use crate::error::RegistryError;
use crate::events::{Bus, ListenerRef, Payload};
use crate::observers::{ObserverRef, same_observer};

/// One live `(topic, observer)` binding.
struct Registration {
    observer: ObserverRef,
    wrapper: Arc<Wrapper>,
}

impl Registration {
    fn listener(&self) -> ListenerRef {
        self.wrapper.clone()
    }
}

#[derive(Default)]
struct Book {
    topics: HashMap<Arc<str>, Vec<Registration>>,
    unloaded: bool,
}

/// Scoped set of observer subscriptions on a shared [`Bus`].
pub struct Registry {
    bus: Bus,
    reporter: Arc<Reporter>,
    book: Mutex<Book>,
}

impl Registry {
    /// Creates a registry on `bus` reporting failures to `sink`.
    pub fn new(bus: Bus, cfg: &Config, sink: Arc<dyn LogSink>) -> Self {
        Self {
            bus,
            reporter: Arc::new(Reporter::new(cfg, sink)),
            book: Mutex::new(Book::default()),
        }
    }

    /// Creates a registry with [`Config::default`] and a [`TracingSink`].
    pub fn with_defaults(bus: Bus) -> Self {
        Self::new(bus, &Config::default(), Arc::new(TracingSink))
    }

    /// Subscribes `observer` to `topic`.
    ///
    /// The caller's location is recorded and reported if the observer panics.
    #[track_caller]
    pub fn add(&self, topic: &str, observer: ObserverRef) -> Result<(), RegistryError> {
        if topic.is_empty() {
            return Err(RegistryError::EmptyTopic);
        }
        let added_at = Location::caller();

        let mut book = self.lock();
        if book.unloaded {
            return Err(RegistryError::Unloaded {
                program: self.reporter.program().to_string(),
            });
        }

        let name = observer.name().to_string();
        let registration = Registration {
            wrapper: Arc::new(Wrapper::new(
                Arc::clone(&observer),
                added_at,
                Arc::clone(&self.reporter),
            )),
            observer,
        };
        self.bus.subscribe(topic, registration.listener());
        book.topics
            .entry(Arc::from(topic))
            .or_default()
            .push(registration);
        drop(book);

        tracing::debug!(topic, observer = %name, "observer added");
        Ok(())
    }

    /// Unsubscribes every registration of `observer` on `topic`.
    ///
    /// A no-op if there is none.
    pub fn remove(&self, topic: &str, observer: &ObserverRef) {
        let mut book = self.lock();
        let Some(list) = book.topics.get_mut(topic) else {
            return;
        };

        let (gone, keep): (Vec<_>, Vec<_>) = std::mem::take(list)
            .into_iter()
            .partition(|r| same_observer(&r.observer, observer));
        if keep.is_empty() {
            book.topics.remove(topic);
        } else {
            *list = keep;
        }

        for registration in &gone {
            self.detach(topic, registration);
        }
        drop(book);

        if !gone.is_empty() {
            tracing::debug!(topic, removed = gone.len(), "observer removed");
        }
    }

    /// Broadcasts on the shared bus and returns how many listeners ran.
    ///
    /// Every listener of `topic` runs, not only this registry's. A missing
    /// `subject` is replaced by [`Payload::placeholder`].
    pub fn notify(&self, topic: &str, subject: Option<Payload>, data: Option<Payload>) -> usize {
        let subject = subject.unwrap_or_else(Payload::placeholder);
        self.bus.broadcast(topic, Some(subject), data)
    }

    /// Removes every registration this registry made. Idempotent.
    pub fn unload(&self) {
        let mut book = self.lock();
        let first = !book.unloaded;
        book.unloaded = true;

        let mut removed = 0usize;
        for (topic, registrations) in book.topics.drain() {
            for registration in &registrations {
                self.detach(&topic, registration);
            }
            removed += registrations.len();
        }
        drop(book);

        if first {
            tracing::debug!(program = self.program(), removed, "registry unloaded");
        }
    }

    /// True once [`Registry::unload`] ran.
    pub fn is_unloaded(&self) -> bool {
        self.lock().unloaded
    }

    /// True if `observer` has at least one registration on `topic`.
    pub fn is_registered(&self, topic: &str, observer: &ObserverRef) -> bool {
        self.lock()
            .topics
            .get(topic)
            .is_some_and(|list| list.iter().any(|r| same_observer(&r.observer, observer)))
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.lock().topics.values().map(Vec::len).sum()
    }

    /// True if there are no live registrations.
    pub fn is_empty(&self) -> bool {
        self.lock().topics.is_empty()
    }

    /// Returns sorted list of topics with live registrations.
    pub fn topics(&self) -> Vec<String> {
        let book = self.lock();
        let mut names: Vec<String> = book.topics.keys().map(|t| t.to_string()).collect();
        names.sort_unstable();
        names
    }

    /// The bus this registry subscribes on.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Program identity used in diagnostics.
    pub fn program(&self) -> &str {
        self.reporter.program()
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn lock(&self) -> MutexGuard<'_, Book> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn detach(&self, topic: &str, registration: &Registration) {
        registration.wrapper.deactivate();
        self.bus.unsubscribe(topic, &registration.listener());
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.unload();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("program", &self.program())
            .field("topics", &self.topics())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::PlainTextConsole;
    use crate::error::ObserverError;
    use crate::events::{ListenerFn, Notification};
    use crate::observers::ObserverFn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Prints = Arc<Mutex<Vec<String>>>;

    fn registry(bus: &Bus) -> (Prints, Registry) {
        let prints: Prints = Arc::new(Mutex::new(Vec::new()));
        let p = Arc::clone(&prints);
        let sink = Arc::new(PlainTextConsole::new(move |t| p.lock().unwrap().push(t.to_owned())));
        let reg = Registry::new(bus.clone(), &Config::for_program("test-addon"), sink);
        (prints, reg)
    }

    fn counting(name: &'static str) -> (Arc<AtomicUsize>, ObserverRef) {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let obs: ObserverRef = ObserverFn::arc(name, move |_n: &Notification| {
            h.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (hits, obs)
    }

    #[test]
    fn test_add_then_notify_delivers_once_with_payloads() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        let seen: Arc<Mutex<Vec<(Payload, Option<String>)>>> = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let cb: ObserverRef = ObserverFn::arc("cb", move |n: &Notification| {
            let subject = n.subject().cloned().expect("subject");
            s.lock().unwrap().push((subject, n.data_str().map(str::to_owned)));
            Ok(())
        });
        reg.add("blarg", cb).unwrap();

        let subject = Payload::new(String::from("http://www.foo.com"));
        reg.notify("blarg", Some(subject.clone()), Some(Payload::text("some data")));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].0.ptr_eq(&subject));
        assert_eq!(seen[0].1.as_deref(), Some("some data"));
    }

    #[test]
    fn test_raw_broadcast_then_remove() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        let (hits, cb) = counting("cb");
        reg.add("blarg", Arc::clone(&cb)).unwrap();

        let uri = Payload::new(String::from("http://www.foo.com"));
        bus.broadcast("blarg", Some(uri), Some(Payload::text("some data")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        reg.remove("blarg", &cb);
        bus.broadcast("blarg", None, Some(Payload::text("some data")));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!bus.has_listeners("blarg"));
    }

    #[test]
    fn test_notify_without_subject_uses_placeholder() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        let placeholder = Arc::new(Mutex::new(None));
        let p = Arc::clone(&placeholder);
        let cb: ObserverRef = ObserverFn::arc("cb", move |n: &Notification| {
            *p.lock().unwrap() = n.subject().map(Payload::is_placeholder);
            Ok(())
        });
        reg.add("blarg", cb).unwrap();

        reg.notify("blarg", None, None);
        assert_eq!(*placeholder.lock().unwrap(), Some(true));
    }

    #[test]
    fn test_duplicate_add_delivers_twice_and_remove_drops_both() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        let (hits, cb) = counting("cb");
        reg.add("t", Arc::clone(&cb)).unwrap();
        reg.add("t", Arc::clone(&cb)).unwrap();
        assert_eq!(reg.len(), 2);

        reg.notify("t", None, None);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        reg.remove("t", &cb);
        reg.notify("t", None, None);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(reg.is_empty());
        assert!(!reg.is_registered("t", &cb));
    }

    #[test]
    fn test_remove_without_match_is_noop() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        let (hits, cb) = counting("cb");
        let (_, other) = counting("other");
        reg.add("t", Arc::clone(&cb)).unwrap();

        reg.remove("t", &other);
        reg.remove("missing", &cb);
        reg.notify("t", None, None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(reg.is_registered("t", &cb));
    }

    #[test]
    fn test_empty_topic_is_rejected() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        let (_, cb) = counting("cb");
        assert_eq!(reg.add("", cb), Err(RegistryError::EmptyTopic));
        assert!(bus.topics().is_empty());
    }

    #[test]
    fn test_failing_observer_is_isolated_and_logged() {
        let bus = Bus::new();
        let (prints, reg) = registry(&bus);
        let raised_line = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&raised_line);
        let bad: ObserverRef = ObserverFn::arc("badCb", move |_n: &Notification| {
            let err = ObserverError::new("foo");
            r.store(err.location().line() as usize, Ordering::SeqCst);
            Err(err)
        });
        let (hits, good) = counting("good");
        reg.add("narg", bad).unwrap();
        reg.add("narg", good).unwrap();

        assert_eq!(reg.notify("narg", Some(Payload::text("yo yo")), None), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let prints = prints.lock().unwrap();
        assert_eq!(prints.len(), 1);
        let lines: Vec<&str> = prints[0].split('\n').collect();
        assert_eq!(lines[0], "error: test-addon: An exception occurred.");
        assert_eq!(lines[1], "Error: foo");
        assert_eq!(
            lines[2],
            format!("{} {}", file!(), raised_line.load(Ordering::SeqCst))
        );
        assert_eq!(lines[3], "Traceback (most recent call last):");
        assert_eq!(
            lines[4],
            format!(
                "  File \"{}\", line {}, in badCb",
                file!(),
                raised_line.load(Ordering::SeqCst)
            )
        );
    }

    #[test]
    fn test_panicking_observer_does_not_stop_siblings() {
        let bus = Bus::new();
        let (prints, reg) = registry(&bus);
        let boom: ObserverRef =
            ObserverFn::arc("boom", |_n: &Notification| -> Result<(), ObserverError> {
                panic!("kaboom")
            });
        let (hits, good) = counting("good");
        reg.add("narg", boom).unwrap();
        let added_line = line!() - 1;
        reg.add("narg", good).unwrap();

        assert_eq!(reg.notify("narg", None, None), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(reg.notify("narg", None, None), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        let prints = prints.lock().unwrap();
        assert_eq!(prints.len(), 2);
        let lines: Vec<&str> = prints[0].split('\n').collect();
        assert_eq!(lines[1], "Error: kaboom");
        assert_eq!(lines[2], format!("{} {}", file!(), added_line));
    }

    #[test]
    fn test_unload_removes_only_own_registrations() {
        let bus = Bus::new();
        let (_p1, mine) = registry(&bus);
        let (_p2, theirs) = registry(&bus);
        let (my_hits, a) = counting("a");
        let (their_hits, b) = counting("b");
        mine.add("blarg", a).unwrap();
        theirs.add("blarg", b).unwrap();

        mine.unload();
        mine.unload();
        assert!(mine.is_empty());
        assert!(mine.is_unloaded());

        assert_eq!(mine.notify("blarg", None, None), 1);
        assert_eq!(my_hits.load(Ordering::SeqCst), 0);
        assert_eq!(their_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_add_after_unload_is_rejected() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        reg.unload();
        let (_, cb) = counting("cb");
        assert_eq!(
            reg.add("t", cb),
            Err(RegistryError::Unloaded {
                program: "test-addon".into()
            })
        );
        assert_eq!(bus.listener_count("t"), 0);
    }

    #[test]
    fn test_drop_unloads() {
        let bus = Bus::new();
        let (hits, cb) = counting("cb");
        {
            let (_prints, reg) = registry(&bus);
            reg.add("t", cb).unwrap();
            assert_eq!(bus.listener_count("t"), 1);
        }
        assert_eq!(bus.broadcast("t", None, None), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_removed_mid_broadcast_is_not_called() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        let reg = Arc::new(reg);
        let (late_hits, late) = counting("late");

        let (r, victim) = (Arc::downgrade(&reg), Arc::clone(&late));
        let remover: ObserverRef = ObserverFn::arc("remover", move |_n: &Notification| {
            if let Some(reg) = r.upgrade() {
                reg.remove("t", &victim);
            }
            Ok(())
        });
        reg.add("t", remover).unwrap();
        reg.add("t", late).unwrap();

        reg.notify("t", None, None);
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_raw_listeners_share_the_topic() {
        let bus = Bus::new();
        let (_prints, reg) = registry(&bus);
        let raw_hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&raw_hits);
        bus.subscribe(
            "t",
            ListenerFn::arc(move |_n: &Notification| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let (_, cb) = counting("cb");
        reg.add("t", cb).unwrap();

        reg.unload();
        reg.notify("t", None, None);
        assert_eq!(raw_hits.load(Ordering::SeqCst), 1);
        assert_eq!(reg.topics(), Vec::<String>::new());
    }
}
