//! Router state management
//!
//! [`RouterState`] owns the route table, the current [`Location`] and the
//! current match. The only transition is [`RouterState::sync`], which
//! replaces location and match together, so the match always describes the
//! stored pathname.

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, MatchCache};
use crate::location::Location;
use crate::params::RouteParams;
use crate::route::{Route, RouteMatch, RouteTable};
use std::sync::Arc;

/// Location, match and route table of one router
pub struct RouterState<H> {
    base: String,
    table: RouteTable<H>,
    location: Location,
    current: Option<RouteMatch<H>>,
    #[cfg(feature = "cache")]
    cache: MatchCache,
}

impl<H> RouterState<H> {
    /// Create an empty state for an already-normalised base prefix
    pub fn new(base: String) -> Self {
        Self {
            base,
            table: RouteTable::new(),
            location: Location::default(),
            current: None,
            #[cfg(feature = "cache")]
            cache: MatchCache::new(),
        }
    }

    /// Create with a specific match cache capacity
    #[cfg(feature = "cache")]
    pub fn with_cache_capacity(base: String, capacity: usize) -> Self {
        Self {
            cache: MatchCache::with_capacity(capacity),
            ..Self::new(base)
        }
    }

    /// Register a route
    pub fn add_route(&mut self, route: Route<H>) {
        self.table.push(route);
        self.invalidate();
    }

    /// Register every route of `table`, sharing them
    pub fn install(&mut self, table: &RouteTable<H>) {
        for route in table.routes() {
            self.table.push_shared(Arc::clone(route));
        }
        self.invalidate();
    }

    /// Parse `href`, store it as the current location and re-match
    pub fn sync(&mut self, href: &str) -> &Location {
        let location = Location::parse(href, &self.base);
        self.current = self.resolve(&location.pathname);
        self.location = location;
        &self.location
    }

    /// Normalised base prefix
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Registered routes
    pub fn table(&self) -> &RouteTable<H> {
        &self.table
    }

    /// Current location
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Current match, if any
    pub fn current_match(&self) -> Option<&RouteMatch<H>> {
        self.current.as_ref()
    }

    /// Parameters of the current match (empty when unmatched)
    pub fn params(&self) -> RouteParams {
        self.current
            .as_ref()
            .map(|found| found.params.clone())
            .unwrap_or_default()
    }

    /// Match cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    #[cfg(feature = "cache")]
    fn resolve(&mut self, pathname: &str) -> Option<RouteMatch<H>> {
        if let Some(cached) = self.cache.get(pathname) {
            return cached.and_then(|(index, params)| {
                self.table.get(index).map(|route| RouteMatch {
                    route: Arc::clone(route),
                    params,
                })
            });
        }

        let resolved = self.table.resolve(pathname);
        self.cache.insert(
            pathname.to_string(),
            resolved
                .as_ref()
                .map(|(index, found)| (*index, found.params.clone())),
        );
        resolved.map(|(_, found)| found)
    }

    #[cfg(not(feature = "cache"))]
    fn resolve(&mut self, pathname: &str) -> Option<RouteMatch<H>> {
        self.table.resolve(pathname).map(|(_, found)| found)
    }

    fn invalidate(&mut self) {
        #[cfg(feature = "cache")]
        self.cache.clear();
    }
}
