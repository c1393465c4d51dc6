//! Router state snapshots
//!
//! Exactly one [`RouterState`] is live per router. It is never mutated in
//! place: every transition start, commit and revert installs a fresh
//! `Rc<RouterState>`, so subscribers can detect changes with `Rc::ptr_eq`.

use crate::location::Location;
use crate::RouteMatch;

/// Whether a navigation is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouterStatus {
    #[default]
    Idle,
    Transitioning,
}

/// Router state
#[derive(Debug, Clone)]
pub struct RouterState {
    /// Committed location
    pub location: Location,
    /// Committed match chain, root to leaf; empty when nothing matched
    pub matches: Vec<RouteMatch>,
    pub status: RouterStatus,
    /// Target of the in-flight transition, if any
    pub pending_location: Option<Location>,
}

impl RouterState {
    /// Idle state at `location` with no matches
    pub fn new(location: Location) -> Self {
        Self {
            location,
            matches: Vec::new(),
            status: RouterStatus::Idle,
            pending_location: None,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.status == RouterStatus::Transitioning
    }

    /// Find the match for a route id
    pub fn get_match(&self, route_id: &str) -> Option<&RouteMatch> {
        self.matches.iter().find(|m| m.route_id == route_id)
    }

    /// Deepest match
    pub fn leaf(&self) -> Option<&RouteMatch> {
        self.matches.last()
    }

    /// Copy of this state marked as transitioning towards `to`
    pub(crate) fn transitioning(&self, to: Location) -> Self {
        Self {
            location: self.location.clone(),
            matches: self.matches.clone(),
            status: RouterStatus::Transitioning,
            pending_location: Some(to),
        }
    }

    /// Idle state for a committed transition
    pub(crate) fn committed(location: Location, matches: Vec<RouteMatch>) -> Self {
        Self {
            location,
            matches,
            status: RouterStatus::Idle,
            pending_location: None,
        }
    }
}

impl Default for RouterState {
    fn default() -> Self {
        Self::new(Location::new("/"))
    }
}
