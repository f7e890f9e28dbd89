//! Browser-style session history
//!
//! [`HistoryApi`] is the host bridge a [`BrowserRuntime`](crate::BrowserRuntime)
//! drives: read the current location, push or replace an entry, and listen
//! for pop-state (back/forward) events. Pushing and replacing are silent;
//! only traversal notifies listeners, exactly like a browser's history.
//!
//! [`MemoryHistory`] implements the bridge in-process with a bounded
//! back/forward stack, for native hosts and tests.

use crate::error::NavigationError;
use crate::observer::{Callback, Subscribers, Subscription};
use crate::trace_log;
use parking_lot::Mutex;

/// Host history primitives
pub trait HistoryApi: Send + Sync {
    /// Current path plus query string, e.g. `/product/42?sort=price_asc`
    fn location(&self) -> String;

    /// Append an entry and make it current; does not notify listeners
    fn push_state(&self, href: &str) -> Result<(), NavigationError>;

    /// Overwrite the current entry; does not notify listeners
    fn replace_state(&self, href: &str) -> Result<(), NavigationError>;

    /// Listen for back/forward traversal
    fn on_pop_state(&self, callback: Callback) -> Subscription;
}

/// Navigation direction indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    /// Navigating forward to a new or later entry
    Forward,
    /// Navigating back in history
    Back,
    /// Replacing the current entry
    Replace,
}

/// Event produced by history operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    /// Previous href
    pub from: String,
    /// New href
    pub to: String,
    /// Navigation direction
    pub direction: NavigationDirection,
}

#[derive(Debug)]
struct Stack {
    entries: Vec<String>,
    current: usize,
    /// Maximum history size (0 = unlimited)
    max_size: usize,
}

impl Stack {
    fn current_href(&self) -> &str {
        &self.entries[self.current]
    }

    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            // Remove oldest entries, keeping the current one reachable
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

/// In-process session history
#[derive(Debug)]
pub struct MemoryHistory {
    stack: Mutex<Stack>,
    pop_listeners: Subscribers,
}

impl MemoryHistory {
    /// Default number of retained entries.
    pub const DEFAULT_MAX_SIZE: usize = 1000;

    /// Create a history whose only entry is `initial_href`
    pub fn new(initial_href: impl Into<String>) -> Self {
        Self::with_max_size(initial_href, Self::DEFAULT_MAX_SIZE)
    }

    /// Create with custom max size (0 = unlimited)
    pub fn with_max_size(initial_href: impl Into<String>, max_size: usize) -> Self {
        Self {
            stack: Mutex::new(Stack {
                entries: vec![initial_href.into()],
                current: 0,
                max_size,
            }),
            pop_listeners: Subscribers::new(),
        }
    }

    /// Go back one entry, notifying pop-state listeners
    pub fn back(&self) -> Option<NavigationEvent> {
        self.go(-1)
    }

    /// Go forward one entry, notifying pop-state listeners
    pub fn forward(&self) -> Option<NavigationEvent> {
        self.go(1)
    }

    /// Move `delta` entries through history
    ///
    /// Out-of-range or zero deltas do nothing and return `None`.
    pub fn go(&self, delta: isize) -> Option<NavigationEvent> {
        let event = {
            let mut stack = self.stack.lock();
            let target = stack.current.checked_add_signed(delta)?;
            if delta == 0 || target >= stack.entries.len() {
                return None;
            }

            let from = stack.current_href().to_string();
            stack.current = target;
            NavigationEvent {
                from,
                to: stack.current_href().to_string(),
                direction: if delta < 0 {
                    NavigationDirection::Back
                } else {
                    NavigationDirection::Forward
                },
            }
        };

        trace_log!("History traversal {:?}: '{}' -> '{}'", event.direction, event.from, event.to);
        self.pop_listeners.notify();
        Some(event)
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.stack.lock().current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        let stack = self.stack.lock();
        stack.current + 1 < stack.entries.len()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.stack.lock().entries.len()
    }

    /// Always false; a history keeps at least its current entry
    pub fn is_empty(&self) -> bool {
        self.stack.lock().entries.is_empty()
    }

    /// Index of the current entry
    pub fn current_index(&self) -> usize {
        self.stack.lock().current
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.stack.lock().entries.clone()
    }

    fn validate(href: &str) -> Result<(), NavigationError> {
        if href.starts_with('/') {
            Ok(())
        } else {
            Err(NavigationError::InvalidHref {
                href: href.to_string(),
                reason: "history entries must be absolute paths".to_string(),
            })
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl HistoryApi for MemoryHistory {
    fn location(&self) -> String {
        self.stack.lock().current_href().to_string()
    }

    fn push_state(&self, href: &str) -> Result<(), NavigationError> {
        Self::validate(href)?;
        let mut stack = self.stack.lock();

        // Remove forward history when pushing
        let keep = stack.current + 1;
        stack.entries.truncate(keep);
        stack.entries.push(href.to_string());
        stack.current += 1;
        stack.enforce_size_limit();
        Ok(())
    }

    fn replace_state(&self, href: &str) -> Result<(), NavigationError> {
        Self::validate(href)?;
        let mut stack = self.stack.lock();
        let current = stack.current;
        stack.entries[current] = href.to_string();
        Ok(())
    }

    fn on_pop_state(&self, callback: Callback) -> Subscription {
        self.pop_listeners.subscribe(move || callback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_history_creation() {
        let history = MemoryHistory::new("/");
        assert_eq!(history.location(), "/");
        assert_eq!(history.len(), 1);
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_history_push() {
        let history = MemoryHistory::new("/");

        history.push_state("/products").unwrap();
        assert_eq!(history.location(), "/products");
        assert_eq!(history.len(), 2);
        assert!(history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_history_back_forward() {
        let history = MemoryHistory::new("/");
        history.push_state("/page1").unwrap();
        history.push_state("/page2").unwrap();

        let event = history.back().unwrap();
        assert_eq!(event.from, "/page2");
        assert_eq!(event.to, "/page1");
        assert_eq!(event.direction, NavigationDirection::Back);
        assert!(history.can_go_forward());

        let event = history.forward().unwrap();
        assert_eq!(event.to, "/page2");
        assert_eq!(event.direction, NavigationDirection::Forward);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_history_truncation_on_push() {
        let history = MemoryHistory::new("/");
        history.push_state("/page1").unwrap();
        history.push_state("/page2").unwrap();
        history.back();

        history.push_state("/page3").unwrap();
        assert_eq!(history.entries(), vec!["/", "/page1", "/page3"]);
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_history_replace() {
        let history = MemoryHistory::new("/");
        history.push_state("/page1").unwrap();

        history.replace_state("/page2").unwrap();
        assert_eq!(history.location(), "/page2");
        assert_eq!(history.len(), 2);

        history.back();
        assert_eq!(history.location(), "/");
    }

    #[test]
    fn test_history_max_size() {
        let history = MemoryHistory::with_max_size("/", 3);
        for page in ["/page1", "/page2", "/page3", "/page4"] {
            history.push_state(page).unwrap();
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.location(), "/page4");
        assert_eq!(history.current_index(), 2);
    }

    #[test]
    fn test_go_out_of_range() {
        let history = MemoryHistory::new("/");
        history.push_state("/a").unwrap();

        assert!(history.go(-5).is_none());
        assert!(history.go(1).is_none());
        assert!(history.go(0).is_none());
        assert_eq!(history.go(-1).unwrap().to, "/");
    }

    #[test]
    fn test_relative_href_rejected() {
        let history = MemoryHistory::new("/");
        let error = history.push_state("product/1").unwrap_err();
        assert_eq!(error.href(), "product/1");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_only_traversal_notifies() {
        let history = MemoryHistory::new("/");
        let pops = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&pops);
        let _subscription = history.on_pop_state(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        history.push_state("/a").unwrap();
        history.replace_state("/b").unwrap();
        assert_eq!(pops.load(Ordering::SeqCst), 0);

        history.back();
        assert_eq!(pops.load(Ordering::SeqCst), 1);
    }
}
