//! Error types
//!
//! Construction and registration problems are fatal and surface as
//! [`RouterError`]. Runtime navigation failures surface as [`NavigationError`]
//! from a [`Runtime`](crate::Runtime), and the router logs and swallows them.
//! A path that matches no route is not an error at all.

use thiserror::Error;

/// Fatal configuration errors raised while building a router or its table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The configured base URL cannot be used as a path prefix.
    #[error("invalid base url '{base}': {reason}")]
    InvalidBaseUrl { base: String, reason: &'static str },

    /// A route pattern failed to compile.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Errors a runtime may report while recording a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The href cannot be represented as a location.
    #[error("invalid href '{href}': {reason}")]
    InvalidHref { href: String, reason: String },

    /// The host refused to record the navigation.
    #[error("navigation to '{href}' rejected: {reason}")]
    Rejected { href: String, reason: String },
}

impl NavigationError {
    /// Shorthand for a host-side rejection.
    pub fn rejected(href: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            href: href.into(),
            reason: reason.into(),
        }
    }

    /// The href the failed navigation targeted.
    pub fn href(&self) -> &str {
        match self {
            Self::InvalidHref { href, .. } | Self::Rejected { href, .. } => href,
        }
    }
}

/// Errors decoding a hydration handoff blob.
#[derive(Debug, Error)]
pub enum HydrationError {
    /// The blob is not valid JSON or does not have the envelope shape.
    #[error("malformed hydration blob: {0}")]
    Json(#[from] serde_json::Error),

    /// The blob was written by an incompatible producer.
    #[error("unsupported hydration blob version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}
