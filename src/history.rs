//! Navigation history management
//!
//! An in-memory stack of committed [`Location`]s with:
//! - Forward/backward navigation
//! - History truncation on new navigation
//! - Configurable history limits
//!
//! The router peeks at neighbouring entries when a back/forward navigation
//! starts and only moves the cursor once that navigation commits.

use crate::location::Location;
use crate::NavigationDirection;

/// Navigation history stack
#[derive(Debug, Clone)]
pub struct History {
    /// History stack
    entries: Vec<Location>,
    /// Current position in history
    current: usize,
    /// Maximum history size (0 = unlimited)
    max_size: usize,
}

impl History {
    pub const DEFAULT_MAX_SIZE: usize = 1000;

    /// Create a new history with an initial location
    pub fn new(initial: Location) -> Self {
        Self::with_max_size(initial, Self::DEFAULT_MAX_SIZE)
    }

    /// Create with custom max size
    pub fn with_max_size(initial: Location, max_size: usize) -> Self {
        Self {
            entries: vec![initial],
            current: 0,
            max_size,
        }
    }

    /// Get current location
    pub fn current(&self) -> &Location {
        &self.entries[self.current]
    }

    /// Push a new location onto history
    ///
    /// This truncates any forward history and adds the new entry
    pub fn push(&mut self, location: Location) -> NavigationEvent {
        let from = self.current().clone();

        self.entries.truncate(self.current + 1);
        self.entries.push(location.clone());
        self.current += 1;

        self.enforce_size_limit();

        NavigationEvent {
            from,
            to: location,
            direction: NavigationDirection::Forward,
        }
    }

    /// Replace current entry
    pub fn replace(&mut self, location: Location) -> NavigationEvent {
        let from = self.current().clone();

        self.entries[self.current] = location.clone();

        NavigationEvent {
            from,
            to: location,
            direction: NavigationDirection::Replace,
        }
    }

    /// Entry one step back, without moving
    pub fn peek_back(&self) -> Option<&Location> {
        self.current.checked_sub(1).map(|i| &self.entries[i])
    }

    /// Entry one step forward, without moving
    pub fn peek_forward(&self) -> Option<&Location> {
        self.entries.get(self.current + 1)
    }

    /// Go back in history
    pub fn back(&mut self) -> Option<NavigationEvent> {
        if !self.can_go_back() {
            return None;
        }
        let from = self.current().clone();
        self.current -= 1;

        Some(NavigationEvent {
            from,
            to: self.current().clone(),
            direction: NavigationDirection::Back,
        })
    }

    /// Go forward in history
    pub fn forward(&mut self) -> Option<NavigationEvent> {
        if !self.can_go_forward() {
            return None;
        }
        let from = self.current().clone();
        self.current += 1;

        Some(NavigationEvent {
            from,
            to: self.current().clone(),
            direction: NavigationDirection::Forward,
        })
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// Get history length
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if history is empty (never true in practice)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[Location] {
        &self.entries
    }

    /// Get current index
    pub fn current_index(&self) -> usize {
        self.current
    }

    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            // Drop oldest entries, keeping the current one reachable
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Location::new("/"))
    }
}

/// Cursor movement produced by a history operation
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationEvent {
    /// Previous location
    pub from: Location,
    /// New location
    pub to: Location,
    /// Navigation direction
    pub direction: NavigationDirection,
}
