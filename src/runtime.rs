//! Hosting runtimes
//!
//! A [`Runtime`] is everything the router needs to know about where it runs:
//! how to read the current href, how to record a navigation, and how to hear
//! about navigations it did not start. Pick one adapter at application entry
//! and inject it into the router.
//!
//! - [`BrowserRuntime`] drives a [`HistoryApi`] host bridge
//! - [`ServerRuntime`] holds the inbound request's href for the lifetime of
//!   one request

use crate::error::NavigationError;
use crate::history::HistoryApi;
use crate::observer::{Callback, Subscription};
use crate::trace_log;
use parking_lot::RwLock;
use std::sync::Arc;

/// Location capability consumed by [`PathRouter`](crate::PathRouter)
pub trait Runtime: Send + Sync {
    /// Current path plus query string
    fn get_href(&self) -> String;

    /// Record a navigation to `href`
    ///
    /// Runtimes without a history concept accept and ignore it.
    fn push(&self, href: &str) -> Result<(), NavigationError> {
        let _ = href;
        Ok(())
    }

    /// Record a navigation that replaces the current entry
    fn replace(&self, href: &str) -> Result<(), NavigationError> {
        self.push(href)
    }

    /// Listen for navigations started outside the router (back/forward)
    fn on_change(&self, callback: Callback) -> Subscription {
        drop(callback);
        Subscription::noop()
    }

    /// Overwrite the current href without recording a navigation
    fn set_href(&self, href: &str) {
        let _ = href;
    }
}

// ============================================================================
// BrowserRuntime
// ============================================================================

/// Runtime backed by session history
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use storefront_router::{BrowserRuntime, MemoryHistory, Runtime};
///
/// let history = Arc::new(MemoryHistory::new("/"));
/// let runtime = BrowserRuntime::new(Arc::clone(&history));
///
/// runtime.push("/cart").unwrap();
/// runtime.push("/cart").unwrap();
/// assert_eq!(history.len(), 2);
/// ```
#[derive(Debug)]
pub struct BrowserRuntime<A: HistoryApi> {
    history: Arc<A>,
}

impl<A: HistoryApi> BrowserRuntime<A> {
    /// Wrap a history bridge
    pub fn new(history: Arc<A>) -> Self {
        Self { history }
    }

    /// The underlying history bridge
    pub fn history(&self) -> &Arc<A> {
        &self.history
    }
}

impl<A: HistoryApi> Runtime for BrowserRuntime<A> {
    fn get_href(&self) -> String {
        self.history.location()
    }

    fn push(&self, href: &str) -> Result<(), NavigationError> {
        if self.history.location() == href {
            trace_log!("Skipping history push to current location '{}'", href);
            return Ok(());
        }
        self.history.push_state(href)
    }

    fn replace(&self, href: &str) -> Result<(), NavigationError> {
        if self.history.location() == href {
            return Ok(());
        }
        self.history.replace_state(href)
    }

    fn on_change(&self, callback: Callback) -> Subscription {
        self.history.on_pop_state(callback)
    }
}

// ============================================================================
// ServerRuntime
// ============================================================================

/// Runtime holding one inbound request's href
///
/// There is no asynchronous navigation source on the server, so
/// [`on_change`](Runtime::on_change) never fires. Build one per request.
#[derive(Debug)]
pub struct ServerRuntime {
    href: RwLock<String>,
}

impl ServerRuntime {
    /// Create from the request URL's path and query
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: RwLock::new(href.into()),
        }
    }
}

impl Runtime for ServerRuntime {
    fn get_href(&self) -> String {
        self.href.read().clone()
    }

    fn push(&self, href: &str) -> Result<(), NavigationError> {
        self.set_href(href);
        Ok(())
    }

    fn set_href(&self, href: &str) {
        *self.href.write() = href.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_server_runtime_overwrites() {
        let runtime = ServerRuntime::new("/product/1");
        assert_eq!(runtime.get_href(), "/product/1");

        runtime.push("/cart").unwrap();
        assert_eq!(runtime.get_href(), "/cart");

        runtime.set_href("/?page=2");
        assert_eq!(runtime.get_href(), "/?page=2");
    }

    #[test]
    fn test_server_runtime_never_notifies() {
        let runtime = ServerRuntime::new("/");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = runtime.on_change(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        runtime.push("/a").unwrap();
        subscription.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_browser_runtime_skips_duplicate_push() {
        let history = Arc::new(MemoryHistory::new("/"));
        let runtime = BrowserRuntime::new(Arc::clone(&history));

        runtime.push("/").unwrap();
        assert_eq!(history.len(), 1);

        runtime.push("/product/1").unwrap();
        runtime.push("/product/1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(runtime.get_href(), "/product/1");
    }

    #[test]
    fn test_browser_runtime_replace() {
        let history = Arc::new(MemoryHistory::new("/"));
        let runtime = BrowserRuntime::new(Arc::clone(&history));

        runtime.replace("/?sort=price_asc").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(runtime.get_href(), "/?sort=price_asc");
    }

    #[test]
    fn test_browser_runtime_forwards_pop_state() {
        let history = Arc::new(MemoryHistory::new("/"));
        let runtime = BrowserRuntime::new(Arc::clone(&history));
        let pops = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pops);
        let _subscription = runtime.on_change(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        runtime.push("/a").unwrap();
        history.back();
        assert_eq!(pops.load(Ordering::SeqCst), 1);
    }
}
