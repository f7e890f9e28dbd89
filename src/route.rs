//! Route definitions and route tables

use crate::error::RouterError;
use crate::matcher::RoutePattern;
use crate::params::RouteParams;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Free-form route metadata (page title, layout, cache hints, ...)
pub type RouteMeta = HashMap<String, Value>;

// ============================================================================
// Route
// ============================================================================

/// A registered route: compiled pattern, opaque handler and metadata
///
/// Immutable once built; routers share routes through `Arc`.
#[derive(Clone)]
pub struct Route<H> {
    pattern: RoutePattern,
    handler: H,
    meta: RouteMeta,
}

impl<H> Route<H> {
    /// Compile `pattern` into a route for `handler`
    pub fn new(pattern: &str, handler: H) -> Result<Self, RouterError> {
        Ok(Self {
            pattern: RoutePattern::compile(pattern)?,
            handler,
            meta: RouteMeta::new(),
        })
    }

    /// Replace the route's metadata
    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    /// The pattern string as registered
    pub fn pattern(&self) -> &str {
        self.pattern.source()
    }

    /// The compiled pattern
    pub fn compiled(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Declared parameter names in order
    pub fn param_names(&self) -> &[String] {
        self.pattern.param_names()
    }

    /// The handler this route resolves to
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// All metadata
    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    /// A single metadata value
    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta.get(key)
    }

    /// Whether this is a catch-all route
    pub fn is_wildcard(&self) -> bool {
        self.pattern.is_wildcard()
    }

    /// Match a normalised pathname against this route alone
    pub fn matches(&self, pathname: &str) -> Option<RouteParams> {
        self.pattern.matches(pathname)
    }

    /// Build a link to this route
    ///
    /// ```
    /// use storefront_router::{Route, RouteParams};
    ///
    /// let route = Route::new("/product/:id/", ()).unwrap();
    /// let params: RouteParams = [("id", "42")].into_iter().collect();
    /// assert_eq!(route.href(&params).as_deref(), Some("/product/42/"));
    /// ```
    pub fn href(&self, params: &RouteParams) -> Option<String> {
        self.pattern.build(params)
    }
}

impl<H> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.source())
            .field("param_names", &self.pattern.param_names())
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RouteMatch
// ============================================================================

/// A matched route together with its decoded parameters
pub struct RouteMatch<H> {
    /// The route that matched
    pub route: Arc<Route<H>>,
    /// Parameters extracted from the pathname
    pub params: RouteParams,
}

impl<H> RouteMatch<H> {
    /// The matched pattern string
    pub fn pattern(&self) -> &str {
        self.route.pattern()
    }
}

impl<H> Clone for RouteMatch<H> {
    fn clone(&self) -> Self {
        Self {
            route: Arc::clone(&self.route),
            params: self.params.clone(),
        }
    }
}

impl<H> fmt::Debug for RouteMatch<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("pattern", &self.route.pattern())
            .field("params", &self.params)
            .finish()
    }
}

// ============================================================================
// RouteTable
// ============================================================================

/// Ordered route table
///
/// Non-wildcard routes are tried in registration order; catch-all routes
/// (`*`, `.*`) are tried only after every other route failed.
///
/// Cloning a table is cheap: routes are shared. Build the application table
/// once and hand a clone to every per-request router.
///
/// # Example
///
/// ```
/// use storefront_router::RouteTable;
///
/// let table = RouteTable::new()
///     .route("*", "not-found").unwrap()
///     .route("/", "home").unwrap()
///     .route("/product/:id/", "detail").unwrap();
///
/// let (_, found) = table.resolve("/product/42").unwrap();
/// assert_eq!(*found.route.handler(), "detail");
///
/// let (_, fallback) = table.resolve("/nope").unwrap();
/// assert_eq!(fallback.pattern(), "*");
/// ```
pub struct RouteTable<H> {
    routes: Vec<Arc<Route<H>>>,
}

impl<H> RouteTable<H> {
    /// Create an empty table
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Builder-style registration
    pub fn route(mut self, pattern: &str, handler: H) -> Result<Self, RouterError> {
        self.push(Route::new(pattern, handler)?);
        Ok(self)
    }

    /// Builder-style registration with metadata
    pub fn route_with_meta(
        mut self,
        pattern: &str,
        handler: H,
        meta: RouteMeta,
    ) -> Result<Self, RouterError> {
        self.push(Route::new(pattern, handler)?.with_meta(meta));
        Ok(self)
    }

    /// Append a route
    pub fn push(&mut self, route: Route<H>) {
        self.routes.push(Arc::new(route));
    }

    /// Append a route already shared with another table
    pub fn push_shared(&mut self, route: Arc<Route<H>>) {
        self.routes.push(route);
    }

    /// Registered routes in registration order
    pub fn routes(&self) -> &[Arc<Route<H>>] {
        &self.routes
    }

    /// Route at a registration index
    pub fn get(&self, index: usize) -> Option<&Arc<Route<H>>> {
        self.routes.get(index)
    }

    /// First route registered with `pattern`
    pub fn find(&self, pattern: &str) -> Option<&Arc<Route<H>>> {
        self.routes.iter().find(|route| route.pattern() == pattern)
    }

    /// Resolve a normalised pathname to its registration index and match
    pub fn resolve(&self, pathname: &str) -> Option<(usize, RouteMatch<H>)> {
        let specific = self
            .routes
            .iter()
            .enumerate()
            .filter(|(_, route)| !route.is_wildcard());
        let fallback = self
            .routes
            .iter()
            .enumerate()
            .filter(|(_, route)| route.is_wildcard());

        specific.chain(fallback).find_map(|(index, route)| {
            route.matches(pathname).map(|params| {
                (
                    index,
                    RouteMatch {
                        route: Arc::clone(route),
                        params,
                    },
                )
            })
        })
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if table is empty
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Clone for RouteTable<H> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
        }
    }
}

impl<H> fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|route| route.pattern()))
            .finish()
    }
}
