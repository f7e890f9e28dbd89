//! The path router
//!
//! [`PathRouter`] translates hrefs into a [`RouteMatch`] and tells
//! subscribers whenever it re-syncs. It never reads or writes locations
//! itself; that is delegated to the injected [`Runtime`].
//!
//! `PathRouter` is a cheap handle: clones share the same state. On the
//! server build one router per request (see
//! [`AppContext::for_request`](crate::AppContext::for_request)); sharing a
//! router between requests shares its location.

#[cfg(feature = "cache")]
use crate::cache::CacheStats;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::location::{normalize_base, with_base, Location};
use crate::observer::{Subscribers, Subscription};
use crate::params::{QueryParams, RouteParams};
use crate::route::{Route, RouteMatch, RouteMeta, RouteTable};
use crate::runtime::Runtime;
use crate::state::RouterState;
use crate::{debug_log, info_log, trace_log, warn_log};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::fmt;
use std::sync::{Arc, Weak};

struct Inner<H> {
    runtime: Arc<dyn Runtime>,
    state: RwLock<RouterState<H>>,
    subscribers: Subscribers,
    runtime_subscription: Mutex<Option<Subscription>>,
    // Held across a runtime write and the matching state update. Reentrant
    // so a runtime that reports its own push through `on_change` can re-sync.
    navigation: ReentrantMutex<()>,
}

impl<H> Drop for Inner<H> {
    fn drop(&mut self) {
        if let Some(subscription) = self.runtime_subscription.get_mut().take() {
            subscription.unsubscribe();
        }
    }
}

/// Universal path router
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use storefront_router::{PathRouter, RouterConfig, ServerRuntime};
///
/// let runtime = Arc::new(ServerRuntime::new("/product/42/?sort=price_asc"));
/// let router = PathRouter::new(runtime, RouterConfig::default()).unwrap();
/// router.add_route("/", "home").unwrap();
/// router.add_route("/product/:id/", "detail").unwrap();
/// router.start();
///
/// assert_eq!(router.target(), Some("detail"));
/// assert_eq!(router.params().get("id"), Some("42"));
/// assert_eq!(router.query().get("sort"), Some("price_asc"));
/// ```
pub struct PathRouter<H> {
    inner: Arc<Inner<H>>,
}

impl<H: Send + Sync + 'static> PathRouter<H> {
    /// Create a router over `runtime`
    ///
    /// Fails if the configured base URL is unusable. The router immediately
    /// listens to `runtime.on_change` and re-syncs on external navigation.
    /// Nothing is matched until [`start`](Self::start) or
    /// [`sync`](Self::sync) runs.
    pub fn new(runtime: Arc<dyn Runtime>, config: RouterConfig) -> Result<Self, RouterError> {
        let base = normalize_base(&config.base_url)?;

        #[cfg(feature = "cache")]
        let state = RouterState::with_cache_capacity(base, config.cache_capacity);
        #[cfg(not(feature = "cache"))]
        let state = RouterState::new(base);

        let inner = Arc::new(Inner {
            runtime: Arc::clone(&runtime),
            state: RwLock::new(state),
            subscribers: Subscribers::new(),
            runtime_subscription: Mutex::new(None),
            navigation: ReentrantMutex::new(()),
        });

        let weak: Weak<Inner<H>> = Arc::downgrade(&inner);
        let subscription = runtime.on_change(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                trace_log!("Runtime reported an external navigation");
                PathRouter { inner }.sync(None);
            }
        }));
        *inner.runtime_subscription.lock() = Some(subscription);

        debug_log!("Router created with base '{}'", config.base_url);
        Ok(Self { inner })
    }

    /// Register a route; earlier registrations win, catch-alls go last
    pub fn add_route(&self, pattern: &str, handler: H) -> Result<(), RouterError> {
        self.add_route_with_meta(pattern, handler, RouteMeta::new())
    }

    /// Register a route with metadata
    pub fn add_route_with_meta(
        &self,
        pattern: &str,
        handler: H,
        meta: RouteMeta,
    ) -> Result<(), RouterError> {
        let route = Route::new(pattern, handler)?.with_meta(meta);
        debug_log!("Registered route '{}'", pattern);
        self.inner.state.write().add_route(route);
        Ok(())
    }

    /// Register every route of a shared table
    pub fn install(&self, table: &RouteTable<H>) {
        debug_log!("Installing {} routes", table.len());
        self.inner.state.write().install(table);
    }

    /// Read the runtime's href and perform the first match
    pub fn start(&self) {
        info_log!("Router starting with {} routes", self.route_count());
        self.sync(None);
    }

    /// Navigate to `href`
    ///
    /// The base prefix is added when missing, the runtime records the
    /// navigation, then the router re-syncs itself: history pushes do not
    /// report back through `on_change`. A runtime error is logged and the
    /// router stays where it was.
    ///
    /// The runtime write and the re-match happen as one step, so a router
    /// shared between threads always ends on the runtime's last href.
    pub fn push(&self, href: &str) {
        self.navigate(href, false);
    }

    /// Navigate to `href`, replacing the current history entry
    pub fn replace(&self, href: &str) {
        self.navigate(href, true);
    }

    /// Re-match against `href`, or against the runtime's href when `None`,
    /// then notify every subscriber
    ///
    /// Subscribers are notified even when the match did not change.
    pub fn sync(&self, href: Option<&str>) {
        {
            let _navigation = self.inner.navigation.lock();
            let raw = match href {
                Some(href) => href.to_string(),
                None => self.inner.runtime.get_href(),
            };
            self.apply(&raw);
        }

        self.inner.subscribers.notify();
    }

    fn navigate(&self, href: &str, replace: bool) {
        let href = with_base(href, &self.base_url());
        {
            let _navigation = self.inner.navigation.lock();
            let result = if replace {
                self.inner.runtime.replace(&href)
            } else {
                self.inner.runtime.push(&href)
            };
            if let Err(error) = result {
                warn_log!("Navigation to '{}' failed: {}", href, error);
                return;
            }
            self.apply(&href);
        }

        self.inner.subscribers.notify();
    }

    fn apply(&self, raw: &str) {
        let mut state = self.inner.state.write();
        let pathname = state.sync(raw).pathname.clone();
        debug_log!(
            "Synced '{}' -> {}",
            pathname,
            state
                .current_match()
                .map_or("no route", |found| found.route.pattern())
        );
    }

    /// Decoded query of the current location
    pub fn query(&self) -> QueryParams {
        self.inner.state.read().location().query()
    }

    /// Merge `patch` into the current query and navigate there
    ///
    /// `None` or empty values delete their key.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use storefront_router::{PathRouter, RouterConfig, ServerRuntime};
    ///
    /// let runtime = Arc::new(ServerRuntime::new("/?page=2&sort=name"));
    /// let router: PathRouter<()> = PathRouter::new(runtime, RouterConfig::default()).unwrap();
    /// router.start();
    ///
    /// router.set_query([("page", None), ("sort", Some("price_asc"))]);
    /// assert_eq!(router.location().href(), "/?sort=price_asc");
    /// ```
    pub fn set_query<I, K, V>(&self, patch: I)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (pathname, mut query) = {
            let state = self.inner.state.read();
            (state.location().pathname.clone(), state.location().query())
        };
        query.merge(patch);

        let search = query.to_query_string();
        if search.is_empty() {
            self.push(&pathname);
        } else {
            self.push(&format!("{}?{}", pathname, search));
        }
    }

    /// Register a change callback
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }
}

impl<H> PathRouter<H> {
    /// Current location
    pub fn location(&self) -> Location {
        self.inner.state.read().location().clone()
    }

    /// Parameters of the current match (empty when unmatched)
    pub fn params(&self) -> RouteParams {
        self.inner.state.read().params()
    }

    /// The matched route
    pub fn route(&self) -> Option<Arc<Route<H>>> {
        self.inner
            .state
            .read()
            .current_match()
            .map(|found| Arc::clone(&found.route))
    }

    /// The matched route together with its parameters
    pub fn current_match(&self) -> Option<RouteMatch<H>> {
        self.inner.state.read().current_match().cloned()
    }

    /// Whether the current location matched a route
    pub fn is_matched(&self) -> bool {
        self.inner.state.read().current_match().is_some()
    }

    /// The matched route's handler
    pub fn target(&self) -> Option<H>
    where
        H: Clone,
    {
        self.inner
            .state
            .read()
            .current_match()
            .map(|found| found.route.handler().clone())
    }

    /// Link to the route registered with `pattern`, base prefix included
    pub fn href_for(&self, pattern: &str, params: &RouteParams) -> Option<String> {
        let state = self.inner.state.read();
        let path = state.table().find(pattern)?.href(params)?;
        Some(with_base(&path, state.base()))
    }

    /// Normalised base URL
    pub fn base_url(&self) -> String {
        self.inner.state.read().base().to_string()
    }

    /// Number of registered routes
    pub fn route_count(&self) -> usize {
        self.inner.state.read().table().len()
    }

    /// The injected runtime
    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.inner.runtime
    }

    /// Match cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.state.read().cache_stats().clone()
    }
}

impl<H> Clone for PathRouter<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H> fmt::Debug for PathRouter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("PathRouter")
            .field("base", &state.base())
            .field("location", state.location())
            .field("route", &state.current_match().map(|found| found.pattern()))
            .field("routes", state.table())
            .field("subscribers", &self.inner.subscribers.len())
            .finish()
    }
}
