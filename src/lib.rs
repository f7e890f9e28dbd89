//! # Storefront Router
//!
//! The routing and state core of a storefront that renders on the server,
//! in the browser, or ahead of time:
//!
//! - **PathRouter** - ordered path patterns with `:name` parameters, a
//!   catch-all fallback, query synchronisation and change notification
//! - **Runtimes** - the hosting environment behind one trait: session
//!   history in the browser, a per-request href on the server
//! - **ObservableStore** - immutable state plus a pure reducer, notifying
//!   only when the state reference changes
//! - **Hydration** - versioned handoff of store state between render passes
//!
//! # Quick Start
//!
//! ```
//! use storefront_router::{AppContext, RouterConfig, RouteTable};
//!
//! #[derive(Clone, Copy, Debug, PartialEq)]
//! enum Page {
//!     Home,
//!     Product,
//!     NotFound,
//! }
//!
//! let table = RouteTable::new()
//!     .route("/", Page::Home).unwrap()
//!     .route("/product/:id/", Page::Product).unwrap()
//!     .route("*", Page::NotFound).unwrap();
//!
//! // One context per inbound request.
//! let ctx = AppContext::for_request(&table, "/product/42/?sort=price_asc", RouterConfig::default())
//!     .unwrap();
//! let router = ctx.router();
//!
//! assert_eq!(router.target(), Some(Page::Product));
//! assert_eq!(router.params().get("id"), Some("42"));
//! assert_eq!(router.query().get("sort"), Some("price_asc"));
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache of resolved pathnames

#![doc(html_root_url = "https://docs.rs/storefront-router/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Core routing modules
pub mod history;
pub mod location;
pub mod matcher;
pub mod params;
pub mod route;
pub mod router;
pub mod runtime;
pub mod state;

// State container
pub mod hydration;
pub mod observer;
pub mod store;

// Error handling and configuration
pub mod config;
pub mod error;

// Application wiring
mod context;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, MatchCache};
pub use config::RouterConfig;
pub use context::AppContext;
pub use error::{HydrationError, NavigationError, RouterError};
pub use history::{HistoryApi, MemoryHistory, NavigationDirection, NavigationEvent};
pub use hydration::{HydrationBlob, HYDRATION_VERSION};
pub use location::Location;
pub use matcher::{RoutePattern, WILDCARD_PATTERNS};
pub use observer::{Callback, Subscribers, Subscription};
pub use params::{QueryParams, RouteParams};
pub use route::{Route, RouteMatch, RouteMeta, RouteTable};
pub use router::PathRouter;
pub use runtime::{BrowserRuntime, Runtime, ServerRuntime};
pub use state::RouterState;
pub use store::{ObservableStore, Reducer};
