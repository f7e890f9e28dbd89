//! Subscriber lists shared by the router, the runtimes and the store
//!
//! Callbacks take no arguments; observers read fresh state back from the
//! object they subscribed to. Notification walks a snapshot of the list in
//! registration order with no lock held, so a callback may subscribe,
//! unsubscribe or read state without deadlocking. A panicking callback is
//! logged and skipped; the remaining callbacks still run.

use crate::error_log;
use parking_lot::Mutex;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

/// A change callback
pub type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Ordered list of change callbacks
#[derive(Clone, Default)]
pub struct Subscribers {
    registry: Arc<Mutex<Registry>>,
}

impl Subscribers {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback; it stays registered until the returned
    /// [`Subscription`] is unsubscribed
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(callback)));
            id
        };

        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Invoke every callback in registration order
    pub fn notify(&self) {
        let snapshot: Vec<Callback> = self
            .registry
            .lock()
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                error_log!("Subscriber panicked during notification; continuing with the rest");
            }
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    /// Whether no callback is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .finish()
    }
}

/// Handle returned by every `subscribe`/`on_change`
///
/// Dropping the handle does not unsubscribe; call
/// [`unsubscribe`](Subscription::unsubscribe) to stop receiving callbacks.
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap an unsubscribe action
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Stop receiving callbacks
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
