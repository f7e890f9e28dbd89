//! Application context
//!
//! An [`AppContext`] is the explicit replacement for module-level router and
//! store singletons: it owns one router and, optionally, the hydration blob
//! handed over by the previous render pass. Build it once at the entry point
//! and thread it through the code that needs routing.
//!
//! On the server, [`AppContext::for_request`] is the only constructor: every
//! call builds a fresh [`ServerRuntime`] and [`PathRouter`] from the shared,
//! immutable [`RouteTable`], so concurrent requests never see each other's
//! location.

use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::hydration::HydrationBlob;
use crate::router::PathRouter;
use crate::route::RouteTable;
use crate::runtime::{Runtime, ServerRuntime};
use crate::store::ObservableStore;
use crate::trace_log;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Router plus render-pass handoff data for one application instance
pub struct AppContext<H> {
    router: PathRouter<H>,
    hydration: Option<HydrationBlob>,
}

impl<H: Send + Sync + 'static> AppContext<H> {
    /// Context for one inbound server request
    ///
    /// ```
    /// use storefront_router::{AppContext, RouterConfig, RouteTable};
    ///
    /// let table = RouteTable::new()
    ///     .route("/", "home").unwrap()
    ///     .route("/product/:id/", "detail").unwrap();
    ///
    /// let ctx = AppContext::for_request(&table, "/product/42", RouterConfig::default()).unwrap();
    /// assert_eq!(ctx.router().target(), Some("detail"));
    /// ```
    pub fn for_request(
        table: &RouteTable<H>,
        href: &str,
        config: RouterConfig,
    ) -> Result<Self, RouterError> {
        trace_log!("Building request context for '{}'", href);
        let runtime = Arc::new(ServerRuntime::new(href));
        let router = PathRouter::new(runtime, config)?;
        router.install(table);
        router.start();

        Ok(Self {
            router,
            hydration: None,
        })
    }

    /// Context for a long-lived client instance
    ///
    /// `hydration` is the blob the server embedded in the page, if any.
    pub fn for_client(
        table: &RouteTable<H>,
        runtime: Arc<dyn Runtime>,
        config: RouterConfig,
        hydration: Option<HydrationBlob>,
    ) -> Result<Self, RouterError> {
        let router = PathRouter::new(runtime, config)?;
        router.install(table);
        router.start();

        Ok(Self { router, hydration })
    }

    /// Attach handoff data to this context
    pub fn with_hydration(mut self, blob: HydrationBlob) -> Self {
        self.hydration = Some(blob);
        self
    }

    /// The context's router
    pub fn router(&self) -> &PathRouter<H> {
        &self.router
    }

    /// Handoff data from the previous render pass
    pub fn hydration(&self) -> Option<&HydrationBlob> {
        self.hydration.as_ref()
    }

    /// Build a store seeded from this context's handoff data
    pub fn store<S, A, F>(&self, name: &str, default: S, reducer: F) -> ObservableStore<S, A>
    where
        S: DeserializeOwned + Send + Sync + 'static,
        F: Fn(&Arc<S>, &A) -> Arc<S> + Send + Sync + 'static,
    {
        ObservableStore::hydrated(name, default, reducer, self.hydration.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::runtime::BrowserRuntime;

    fn table() -> RouteTable<&'static str> {
        RouteTable::new()
            .route("/", "home")
            .and_then(|t| t.route("/product/:id/", "detail"))
            .and_then(|t| t.route("*", "not-found"))
            .unwrap()
    }

    #[test]
    fn test_request_contexts_are_isolated() {
        let table = table();
        let a = AppContext::for_request(&table, "/a", RouterConfig::default()).unwrap();
        let b = AppContext::for_request(&table, "/product/2", RouterConfig::default()).unwrap();

        a.router().push("/product/1");
        assert_eq!(a.router().params().get("id"), Some("1"));
        assert_eq!(b.router().params().get("id"), Some("2"));
        assert_eq!(b.router().location().pathname, "/product/2");
    }

    #[test]
    fn test_client_context() {
        let history = Arc::new(MemoryHistory::new("/product/5"));
        let runtime = Arc::new(BrowserRuntime::new(history));
        let ctx = AppContext::for_client(&table(), runtime, RouterConfig::default(), None).unwrap();

        assert_eq!(ctx.router().target(), Some("detail"));
        assert!(ctx.hydration().is_none());
    }

    #[test]
    fn test_store_hydrates_from_context() {
        let mut blob = HydrationBlob::new();
        blob.insert("cart", &vec![1_u32, 2, 3]).unwrap();

        let ctx = AppContext::for_request(&table(), "/", RouterConfig::default())
            .unwrap()
            .with_hydration(blob);
        let store = ctx.store("cart", Vec::<u32>::new(), |state: &Arc<Vec<u32>>, _: &()| {
            Arc::clone(state)
        });

        assert_eq!(*store.get_state(), vec![1, 2, 3]);
    }
}
