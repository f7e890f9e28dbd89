//! Route pattern compilation and matching
//!
//! A pattern is compiled once, at registration, into a list of tokens:
//!
//! - `:name` (name is `[A-Za-z0-9_]+`) captures one or more characters other
//!   than `/`
//! - every other character is matched literally
//! - the whole pattern is anchored at both ends
//!
//! Parameters may sit inside a segment (`/file-:id.json`); the matcher
//! backtracks so a capture gives characters back to the literal that follows.
//!
//! The reserved patterns `*` and `.*` compile to a catch-all that matches any
//! pathname and captures nothing. Trailing slashes are stripped from patterns
//! (except `/` itself) just as they are stripped from locations, so
//! `/product/:id/` and `/product/:id` accept the same paths.

use crate::error::RouterError;
use crate::params::{decode_uri_component, encode_uri_component, RouteParams};

/// Patterns that match any pathname.
pub const WILDCARD_PATTERNS: [&str; 2] = ["*", ".*"];

/// A single token of a compiled pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text that must match exactly
    Static(String),
    /// Named capture of one or more non-`/` characters
    Param(String),
}

/// A compiled route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    tokens: Vec<Token>,
    param_names: Vec<String>,
    wildcard: bool,
}

impl RoutePattern {
    /// Compile a pattern string
    ///
    /// # Examples
    ///
    /// ```
    /// use storefront_router::matcher::RoutePattern;
    ///
    /// let pattern = RoutePattern::compile("/product/:id/").unwrap();
    /// assert_eq!(pattern.param_names(), ["id"]);
    ///
    /// let params = pattern.matches("/product/42").unwrap();
    /// assert_eq!(params.get("id"), Some("42"));
    /// ```
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        if WILDCARD_PATTERNS.contains(&pattern) {
            return Ok(Self {
                source: pattern.to_string(),
                tokens: Vec::new(),
                param_names: Vec::new(),
                wildcard: true,
            });
        }

        let invalid = |reason: &str| RouterError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let normalized = normalize_pattern(pattern);
        if normalized.contains("//") {
            return Err(invalid("pattern cannot contain consecutive slashes"));
        }
        if normalized.contains(['?', '#']) {
            return Err(invalid("pattern cannot contain a query or fragment"));
        }

        let mut tokens = Vec::new();
        let mut param_names: Vec<String> = Vec::new();
        let mut literal = String::new();
        let mut chars = normalized.chars().peekable();

        while let Some(c) = chars.next() {
            if c != ':' {
                literal.push(c);
                continue;
            }

            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }

            if name.is_empty() {
                return Err(invalid("parameter name cannot be empty"));
            }
            if param_names.contains(&name) {
                return Err(invalid(&format!("duplicate parameter ':{}'", name)));
            }

            if !literal.is_empty() {
                tokens.push(Token::Static(std::mem::take(&mut literal)));
            }
            param_names.push(name.clone());
            tokens.push(Token::Param(name));
        }

        if !literal.is_empty() {
            tokens.push(Token::Static(literal));
        }

        Ok(Self {
            source: pattern.to_string(),
            tokens,
            param_names,
            wildcard: false,
        })
    }

    /// The pattern as registered
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared parameter names, in order of appearance
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Compiled tokens (empty for the catch-all)
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether this is one of the reserved catch-all patterns
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Match a normalised pathname
    ///
    /// Returns the percent-decoded captures keyed by parameter name, in
    /// declaration order.
    pub fn matches(&self, pathname: &str) -> Option<RouteParams> {
        if self.wildcard {
            return Some(RouteParams::new());
        }

        let mut captures = Vec::with_capacity(self.param_names.len());
        if !match_tokens(&self.tokens, pathname, &mut captures) {
            return None;
        }

        Some(
            self.param_names
                .iter()
                .zip(captures)
                .map(|(name, raw)| (name.clone(), decode_uri_component(raw)))
                .collect(),
        )
    }

    /// Build a concrete path by substituting `params` into the pattern
    ///
    /// Values are percent-encoded. Returns `None` for the catch-all or when a
    /// declared parameter is missing or empty.
    pub fn build(&self, params: &RouteParams) -> Option<String> {
        if self.wildcard {
            return None;
        }

        let mut path = String::new();
        for token in &self.tokens {
            match token {
                Token::Static(text) => path.push_str(text),
                Token::Param(name) => {
                    let value = params.get(name).filter(|v| !v.is_empty())?;
                    path.push_str(&encode_uri_component(value));
                }
            }
        }

        // Keep the trailing slash the pattern was registered with.
        if self.source.len() > 1 && self.source.ends_with('/') && !path.ends_with('/') {
            path.push('/');
        }
        Some(path)
    }
}

/// Strip trailing slashes (except for the root) and default to `/`
fn normalize_pattern(pattern: &str) -> &str {
    let trimmed = pattern.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Anchored, backtracking match of `tokens` against all of `path`
fn match_tokens<'p>(tokens: &[Token], path: &'p str, captures: &mut Vec<&'p str>) -> bool {
    let Some((token, rest)) = tokens.split_first() else {
        return path.is_empty();
    };

    match token {
        Token::Static(text) => match path.strip_prefix(text.as_str()) {
            Some(remaining) => match_tokens(rest, remaining, captures),
            None => false,
        },
        Token::Param(_) => {
            let segment_end = path.find('/').unwrap_or(path.len());
            if segment_end == 0 {
                return false;
            }

            // Longest capture first, giving characters back on failure.
            let mut ends: Vec<usize> = path[..segment_end]
                .char_indices()
                .map(|(i, c)| i + c.len_utf8())
                .collect();
            ends.reverse();

            for end in ends {
                captures.push(&path[..end]);
                if match_tokens(rest, &path[end..], captures) {
                    return true;
                }
                captures.pop();
            }
            false
        }
    }
}
