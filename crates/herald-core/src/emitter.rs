//! Typed publish/subscribe primitive.
//!
//! An [`Emitter<T>`] carries exactly one event type. Every other part of Herald
//! publishes through emitters: the gateway owns one per event category and
//! applications attach listeners to the ones they care about.
//!
//! ```rust,ignore
//! use herald_core::Emitter;
//!
//! let ready: Emitter<Ready> = Emitter::new();
//! let subscription = ready.on(|_| println!("connected"));
//!
//! ready.emit(&Ready);
//! subscription.unsubscribe();
//! ```
//!
//! # Delivery
//!
//! [`Emitter::emit`] runs synchronously. Listeners registered when the call
//! starts are invoked in registration order and all receive the same `&T`.
//! A listener that panics is logged and skipped; the remaining listeners
//! still run and the panic never escapes `emit`.

use std::any::type_name;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{error, trace};

/// A listener attached to an [`Emitter<T>`].
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Slot<T> {
    id: u64,
    listener: Listener<T>,
}

struct Registry<T> {
    next_id: AtomicU64,
    slots: RwLock<Vec<Slot<T>>>,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            slots: RwLock::new(Vec::new()),
        }
    }
}

/// Type-erased removal, so [`Subscription`] does not carry the event type.
trait Detach: Send + Sync {
    fn detach(&self, id: u64) -> bool;
    fn contains(&self, id: u64) -> bool;
}

impl<T: 'static> Detach for Registry<T> {
    fn detach(&self, id: u64) -> bool {
        let mut slots = self.slots.write();
        let before = slots.len();
        slots.retain(|slot| slot.id != id);
        slots.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        self.slots.read().iter().any(|slot| slot.id == id)
    }
}

/// A single-event-type publish/subscribe bus.
pub struct Emitter<T> {
    registry: Arc<Registry<T>>,
}

impl<T: 'static> Emitter<T> {
    /// Creates an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }

    /// Registers a listener and returns a handle that can remove it again.
    pub fn on<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.slots.write().push(Slot {
            id,
            listener: Arc::new(listener),
        });

        let registry: Weak<dyn Detach> = Arc::downgrade(&self.registry) as Weak<dyn Detach>;
        Subscription { id, registry }
    }

    /// Publishes `event` to every listener registered at the time of the call.
    ///
    /// Returns the number of listeners that ran to completion.
    pub fn emit(&self, event: &T) -> usize {
        // Snapshot so listeners may subscribe or unsubscribe while running.
        let listeners: Vec<Listener<T>> = self
            .registry
            .slots
            .read()
            .iter()
            .map(|slot| Arc::clone(&slot.listener))
            .collect();

        trace!(
            event = type_name::<T>(),
            listeners = listeners.len(),
            "Emitting event"
        );

        let mut completed = 0;
        for listener in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => completed += 1,
                Err(cause) => {
                    error!(
                        event = type_name::<T>(),
                        panic = %panic_message(cause.as_ref()),
                        "Event listener panicked"
                    );
                }
            }
        }
        completed
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.registry.slots.read().len()
    }

    /// Returns `true` if at least one listener is registered.
    pub fn has_listeners(&self) -> bool {
        !self.registry.slots.read().is_empty()
    }

    /// Removes every listener.
    pub fn clear(&self) {
        self.registry.slots.write().clear();
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("event", &type_name::<T>())
            .field("listener_count", &self.registry.slots.read().len())
            .finish()
    }
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Handle returned by [`Emitter::on`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: u64,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    /// Removes the listener.
    ///
    /// Returns `false` if it was already gone or the emitter was dropped.
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.detach(self.id))
    }

    /// Returns `true` while the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug)]
    struct Ping(u32);

    #[test]
    fn test_emit_in_registration_order() {
        let emitter = Emitter::<Ping>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            emitter.on(move |ping: &Ping| seen.lock().unwrap().push((tag, ping.0)));
        }

        assert_eq!(emitter.emit(&Ping(7)), 3);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 7), ("second", 7), ("third", 7)]
        );
    }

    #[test]
    fn test_emit_without_listeners() {
        let emitter = Emitter::<Ping>::new();
        assert_eq!(emitter.emit(&Ping(1)), 0);
        assert!(!emitter.has_listeners());
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let emitter = Emitter::<Ping>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        emitter.on(|_| panic!("listener failure"));
        let c = Arc::clone(&counter);
        emitter.on(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(emitter.emit(&Ping(1)), 1);
        assert_eq!(emitter.emit(&Ping(2)), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let emitter = Emitter::<Ping>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let c = Arc::clone(&counter);
        let subscription = emitter.on(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(subscription.is_active());

        emitter.emit(&Ping(1));
        assert!(subscription.unsubscribe());
        emitter.emit(&Ping(2));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_unsubscribe_after_emitter_dropped() {
        let emitter = Emitter::<Ping>::new();
        let subscription = emitter.on(|_| {});
        drop(emitter);

        assert!(!subscription.is_active());
        assert!(!subscription.unsubscribe());
    }

    #[test]
    fn test_listener_can_subscribe_during_emit() {
        let emitter = Arc::new(Emitter::<Ping>::new());
        let inner = Arc::clone(&emitter);

        emitter.on(move |_| {
            inner.on(|_| {});
        });

        // The listener added during emit only runs on the next emit.
        assert_eq!(emitter.emit(&Ping(1)), 1);
        assert_eq!(emitter.listener_count(), 2);
    }

    #[test]
    fn test_clear() {
        let emitter = Emitter::<Ping>::new();
        let subscription = emitter.on(|_| {});
        emitter.on(|_| {});

        emitter.clear();
        assert_eq!(emitter.listener_count(), 0);
        assert!(!subscription.unsubscribe());
    }
}
