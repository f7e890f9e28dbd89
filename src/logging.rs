//! Logging shim
//!
//! The crate logs through these macros so the backend is a compile-time choice:
//!
//! - `log` (default) - forwards to the `log` facade
//! - `tracing` - forwards to `tracing` events
//!
//! With neither feature enabled the macros expand to nothing.
//!
//! ```ignore
//! use storefront_router::{debug_log, warn_log};
//!
//! debug_log!("synced '{}'", pathname);
//! warn_log!("navigation to '{}' rejected", href);
//! ```

/// Trace-level event, used for per-sync and cache chatter.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

/// Debug-level event.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

/// Info-level event, used for router start-up.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

/// Warn-level event, used for swallowed navigation failures and
/// hydration fallbacks.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

/// Error-level event.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}
