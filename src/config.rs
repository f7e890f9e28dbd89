//! Router configuration

use serde::{Deserialize, Serialize};

/// Settings applied when a [`PathRouter`](crate::PathRouter) is built
///
/// Deserialisable so hosts can keep it next to the rest of their settings:
///
/// ```
/// use storefront_router::RouterConfig;
///
/// let config: RouterConfig = serde_json::from_str(r#"{ "base_url": "/shop/" }"#).unwrap();
/// assert_eq!(config.base_url, "/shop/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Prefix the app is mounted under; stripped before matching and
    /// prepended on navigation
    pub base_url: String,
    /// Pathnames remembered by the match cache
    #[cfg(feature = "cache")]
    pub cache_capacity: usize,
}

impl RouterConfig {
    /// Default configuration: mounted at the root
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
            #[cfg(feature = "cache")]
            cache_capacity: crate::cache::MatchCache::DEFAULT_CAPACITY,
        }
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the match cache capacity
    #[cfg(feature = "cache")]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}
