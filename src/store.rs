//! Observable store
//!
//! [`ObservableStore`] holds one immutable state value behind an `Arc` and a
//! pure reducer `(state, action) -> state`. Subscribers are notified only
//! when the reducer returns a *different* `Arc`; reducers signal "no change"
//! by returning `Arc::clone(state)`. A fresh `Arc` with identical contents
//! still counts as a change.
//!
//! ```
//! use std::sync::Arc;
//! use storefront_router::ObservableStore;
//!
//! enum CounterAction {
//!     Add(u32),
//!     Reset,
//! }
//!
//! let store = ObservableStore::new(0u32, |state: &Arc<u32>, action: &CounterAction| {
//!     match action {
//!         CounterAction::Add(0) => Arc::clone(state),
//!         CounterAction::Add(n) => Arc::new(**state + n),
//!         CounterAction::Reset if **state == 0 => Arc::clone(state),
//!         CounterAction::Reset => Arc::new(0),
//!     }
//! });
//!
//! assert!(store.dispatch(CounterAction::Add(2)));
//! assert!(!store.dispatch(CounterAction::Add(0)));
//! assert_eq!(*store.get_state(), 2);
//! ```

use crate::error::HydrationError;
use crate::hydration::HydrationBlob;
use crate::observer::{Subscribers, Subscription};
use crate::{debug_log, trace_log, warn_log};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A pure state transition
pub type Reducer<S, A> = Box<dyn Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync>;

/// Immutable-state container driven by a reducer
pub struct ObservableStore<S, A> {
    state: RwLock<Arc<S>>,
    reducer: Reducer<S, A>,
    subscribers: Subscribers,
}

impl<S, A> ObservableStore<S, A>
where
    S: Send + Sync + 'static,
{
    /// Create a store seeded with `initial`
    pub fn new<F>(initial: S, reducer: F) -> Self
    where
        F: Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync + 'static,
    {
        Self::from_arc(Arc::new(initial), reducer)
    }

    /// Create a store from an already shared state value
    pub fn from_arc<F>(initial: Arc<S>, reducer: F) -> Self
    where
        F: Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync + 'static,
    {
        Self {
            state: RwLock::new(initial),
            reducer: Box::new(reducer),
            subscribers: Subscribers::new(),
        }
    }

    /// Create a store seeded from a previous render pass
    ///
    /// The blob is consulted once, here. When it has no entry for `name`, or
    /// the entry does not decode as `S`, the store starts from `default`.
    pub fn hydrated<F>(name: &str, default: S, reducer: F, blob: Option<&HydrationBlob>) -> Self
    where
        S: DeserializeOwned,
        F: Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync + 'static,
    {
        let initial = match blob.and_then(|blob| blob.get::<S>(name)) {
            Some(Ok(state)) => {
                debug_log!("Store '{}' hydrated from handoff blob", name);
                state
            }
            Some(Err(error)) => {
                warn_log!("Ignoring hydration data for store '{}': {}", name, error);
                default
            }
            None => default,
        };
        Self::new(initial, reducer)
    }

    /// Current state; treat it as read-only
    pub fn get_state(&self) -> Arc<S> {
        Arc::clone(&*self.state.read())
    }

    /// Apply `action` and notify subscribers if the state changed
    ///
    /// Returns whether the state was replaced. Concurrent dispatches are
    /// applied one after another, each reducer seeing the previous result.
    /// The reducer may read [`get_state`](Self::get_state) but must not
    /// dispatch into the same store. A panicking reducer propagates to the
    /// caller and leaves the state untouched.
    pub fn dispatch(&self, action: A) -> bool {
        let guard = self.state.upgradable_read();
        let next = (self.reducer)(&*guard, &action);

        if Arc::ptr_eq(&*guard, &next) {
            trace_log!("Dispatch left state unchanged");
            return false;
        }

        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        *guard = next;
        drop(guard);

        self.subscribers.notify();
        true
    }

    /// Register a change callback
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Record the current state in `blob` under `name`
    pub fn dehydrate_into(&self, name: &str, blob: &mut HydrationBlob) -> Result<(), HydrationError>
    where
        S: Serialize,
    {
        blob.insert(name, self.get_state().as_ref())
    }
}

impl<S: fmt::Debug, A> fmt::Debug for ObservableStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableStore")
            .field("state", &*self.state.read())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Product {
        id: u32,
        title: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct ProductsState {
        products: Vec<Product>,
        loading: bool,
        error: Option<String>,
    }

    enum ProductsAction {
        Loading,
        Loaded(Vec<Product>),
        Failed(String),
        Touch,
        Explode,
    }

    fn reduce(state: &Arc<ProductsState>, action: &ProductsAction) -> Arc<ProductsState> {
        match action {
            ProductsAction::Loading if state.loading => Arc::clone(state),
            ProductsAction::Loading => Arc::new(ProductsState {
                loading: true,
                error: None,
                ..(**state).clone()
            }),
            ProductsAction::Loaded(products) => Arc::new(ProductsState {
                products: products.clone(),
                loading: false,
                error: None,
            }),
            ProductsAction::Failed(message) => Arc::new(ProductsState {
                loading: false,
                error: Some(message.clone()),
                ..(**state).clone()
            }),
            ProductsAction::Touch => Arc::new((**state).clone()),
            ProductsAction::Explode => panic!("reducer failure"),
        }
    }

    fn counted(store: &ObservableStore<ProductsState, ProductsAction>) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _ = store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        calls
    }

    #[test]
    fn test_dispatch_replaces_state() {
        let store = ObservableStore::new(ProductsState::default(), reduce);
        let calls = counted(&store);

        assert!(store.dispatch(ProductsAction::Loading));
        assert!(store.get_state().loading);

        let products = vec![Product {
            id: 1,
            title: "Mug".to_string(),
        }];
        assert!(store.dispatch(ProductsAction::Loaded(products.clone())));
        assert_eq!(store.get_state().products, products);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_identical_reference_does_not_notify() {
        let store = ObservableStore::new(ProductsState::default(), reduce);
        store.dispatch(ProductsAction::Loading);
        let calls = counted(&store);
        let before = store.get_state();

        assert!(!store.dispatch(ProductsAction::Loading));
        assert!(Arc::ptr_eq(&before, &store.get_state()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_new_reference_with_same_contents_notifies_once() {
        let store = ObservableStore::new(ProductsState::default(), reduce);
        let calls = counted(&store);

        assert!(store.dispatch(ProductsAction::Touch));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*store.get_state(), ProductsState::default());
    }

    #[test]
    fn test_errors_are_state() {
        let store = ObservableStore::new(ProductsState::default(), reduce);
        store.dispatch(ProductsAction::Failed("timeout".to_string()));
        assert_eq!(store.get_state().error.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_reducer_panic_propagates() {
        let store = ObservableStore::new(ProductsState::default(), reduce);
        let calls = counted(&store);
        let before = store.get_state();

        let result = catch_unwind(AssertUnwindSafe(|| store.dispatch(ProductsAction::Explode)));
        assert!(result.is_err());
        assert!(Arc::ptr_eq(&before, &store.get_state()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(store.dispatch(ProductsAction::Loading));
    }

    #[test]
    fn test_concurrent_dispatch_applies_every_action() {
        let store = Arc::new(ObservableStore::new(0_u32, |state: &Arc<u32>, add: &u32| {
            std::thread::sleep(std::time::Duration::from_millis(5));
            Arc::new(**state + add)
        }));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _ = store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.dispatch(1))
            })
            .collect();
        for worker in workers {
            assert!(worker.join().unwrap());
        }

        assert_eq!(*store.get_state(), 8);
        assert_eq!(calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_reducer_can_read_state() {
        let store: Arc<ObservableStore<u32, ()>> = Arc::new_cyclic(|weak| {
            let weak: std::sync::Weak<ObservableStore<u32, ()>> = weak.clone();
            ObservableStore::new(1_u32, move |state: &Arc<u32>, _: &()| {
                let seen = weak.upgrade().map_or(0, |store| *store.get_state());
                Arc::new(**state + seen)
            })
        });

        assert!(store.dispatch(()));
        assert_eq!(*store.get_state(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let store = ObservableStore::new(ProductsState::default(), reduce);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = store.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.dispatch(ProductsAction::Touch);
        subscription.unsubscribe();
        store.dispatch(ProductsAction::Touch);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hydrated_from_blob() {
        let server = ObservableStore::new(ProductsState::default(), reduce);
        server.dispatch(ProductsAction::Loaded(vec![Product {
            id: 7,
            title: "Lamp".to_string(),
        }]));

        let mut blob = HydrationBlob::new();
        server.dehydrate_into("products", &mut blob).unwrap();

        let client = ObservableStore::hydrated("products", ProductsState::default(), reduce, Some(&blob));
        assert_eq!(*client.get_state(), *server.get_state());
    }

    #[test]
    fn test_hydration_falls_back_to_default() {
        let mut blob = HydrationBlob::new();
        blob.insert("products", &"not a state").unwrap();

        let bad = ObservableStore::hydrated("products", ProductsState::default(), reduce, Some(&blob));
        assert_eq!(*bad.get_state(), ProductsState::default());

        let missing = ObservableStore::hydrated("cart", ProductsState::default(), reduce, Some(&blob));
        assert_eq!(*missing.get_state(), ProductsState::default());

        let none = ObservableStore::hydrated("products", ProductsState::default(), reduce, None);
        assert_eq!(*none.get_state(), ProductsState::default());
    }
}
