//! Location parsing and normalisation

use crate::error::RouterError;
use crate::params::QueryParams;

/// Where the router currently is, in app-local terms
///
/// `pathname` never carries the base prefix, is never empty and has no
/// trailing slash unless it is the root. `search` is the raw query string
/// without its leading `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    /// Parse a raw href relative to a normalised base prefix
    ///
    /// Accepts `path?query`, absolute URLs (`https://shop.test/path`) and
    /// hrefs carrying a `#fragment`, which is dropped.
    ///
    /// ```
    /// use storefront_router::Location;
    ///
    /// let location = Location::parse("/shop/product/42/?sort=price_asc#reviews", "/shop");
    /// assert_eq!(location.pathname, "/product/42");
    /// assert_eq!(location.search, "sort=price_asc");
    /// ```
    pub fn parse(href: &str, base: &str) -> Self {
        let href = href.split_once('#').map_or(href, |(before, _)| before);
        let href = strip_origin(href);
        let (path, search) = href.split_once('?').unwrap_or((href, ""));

        Self {
            pathname: normalize_pathname(strip_base(path, base)),
            search: search.to_string(),
        }
    }

    /// Decoded query string
    pub fn query(&self) -> QueryParams {
        QueryParams::parse(&self.search)
    }

    /// App-local href (`pathname` plus `?search` when present)
    pub fn href(&self) -> String {
        if self.search.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, self.search)
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self {
            pathname: "/".to_string(),
            search: String::new(),
        }
    }
}

/// Validate a base URL and strip its trailing slashes
///
/// `""` and `"/"` both normalise to the empty base.
pub fn normalize_base(base: &str) -> Result<String, RouterError> {
    let invalid = |reason| RouterError::InvalidBaseUrl {
        base: base.to_string(),
        reason,
    };

    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if !trimmed.starts_with('/') {
        return Err(invalid("base url must start with '/'"));
    }
    if trimmed.contains(['?', '#']) {
        return Err(invalid("base url cannot contain a query or fragment"));
    }
    Ok(trimmed.to_string())
}

/// Prefix an app-local href with `base` unless it already carries it
pub fn with_base(href: &str, base: &str) -> String {
    if base.is_empty() || has_base(href, base) {
        return href.to_string();
    }
    if href.is_empty() || href.starts_with('?') {
        return format!("{}{}", base, href);
    }
    if href.starts_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}

fn has_base(href: &str, base: &str) -> bool {
    href.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(['/', '?', '#']))
}

fn strip_base<'a>(path: &'a str, base: &str) -> &'a str {
    if base.is_empty() {
        return path;
    }
    match path.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    }
}

fn strip_origin(href: &str) -> &str {
    let Some(scheme_end) = href.find("://") else {
        return href;
    };
    // A "://" after the first '/' or '?' is part of the path or query.
    if href[..scheme_end].contains(['/', '?']) {
        return href;
    }
    let after_authority = &href[scheme_end + 3..];
    match after_authority.find(['/', '?']) {
        Some(index) => &after_authority[index..],
        None => "",
    }
}

fn normalize_pathname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
