//! Error handling for the router
//!
//! Build-time errors abort router construction. Loader errors are attached to
//! the match they came from and only escalate to a [`NavigationError`] when
//! no error boundary in the chain can contain them. "No route matched" and
//! "navigation was superseded" are ordinary [`NavigationResult`]s, not errors.

use crate::history::NavigationEvent;
use crate::state::RouterState;
use std::error::Error as StdError;
use std::rc::Rc;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Route Tree Errors
// ============================================================================

/// Errors raised while building the route tree index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTreeError {
    /// Two nodes resolved to the same route id
    #[error("duplicate route id: {0}")]
    DuplicateRouteId(String),

    /// A route path template failed validation
    #[error("invalid route path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A pathless layout route was registered without an explicit id
    #[error("pathless route under '{parent}' needs an explicit id")]
    MissingRouteId { parent: String },
}

// ============================================================================
// Loader Errors
// ============================================================================

/// Failure produced by a route loader.
///
/// Cheap to clone so it can live inside [`RouteMatch`](crate::RouteMatch)
/// snapshots handed to every subscriber.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LoaderError {
    message: String,
    #[source]
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl LoaderError {
    /// Create a loader error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, keeping it reachable through `source()`
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }

    /// The error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl PartialEq for LoaderError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

// ============================================================================
// Navigation Errors and Results
// ============================================================================

/// Errors surfaced to the caller of [`Router::navigate`](crate::Router::navigate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    /// A loader failed and no route in its chain (nor the router) declares an
    /// error boundary. The router state has been reverted.
    #[error("unhandled loader error in route '{route_id}': {error}")]
    UnhandledLoaderError { route_id: String, error: LoaderError },
}

impl NavigationError {
    /// Id of the route whose loader failed
    pub fn route_id(&self) -> &str {
        match self {
            NavigationError::UnhandledLoaderError { route_id, .. } => route_id,
        }
    }
}

/// Non-error outcome of a navigation attempt.
#[derive(Debug, Clone)]
pub enum NavigationResult {
    /// The transition committed; the new state is live
    Committed {
        state: Rc<RouterState>,
        /// How history moved
        event: NavigationEvent,
    },
    /// No route chain matched; the committed state has no matches
    NotFound {
        state: Rc<RouterState>,
        event: NavigationEvent,
    },
    /// A blocker denied the navigation before any transition started
    Blocked { to: String },
    /// A newer navigation superseded this one; nothing was committed
    Superseded,
}

impl NavigationResult {
    /// Check if navigation committed a matched chain
    pub fn is_committed(&self) -> bool {
        matches!(self, NavigationResult::Committed { .. })
    }

    /// Check if no route matched
    pub fn is_not_found(&self) -> bool {
        matches!(self, NavigationResult::NotFound { .. })
    }

    /// Check if navigation was blocked
    pub fn is_blocked(&self) -> bool {
        matches!(self, NavigationResult::Blocked { .. })
    }

    /// Check if navigation was superseded
    pub fn is_superseded(&self) -> bool {
        matches!(self, NavigationResult::Superseded)
    }

    /// The committed state, for `Committed` and `NotFound`
    pub fn state(&self) -> Option<&Rc<RouterState>> {
        match self {
            NavigationResult::Committed { state, .. } | NavigationResult::NotFound { state, .. } => {
                Some(state)
            }
            _ => None,
        }
    }

    /// The history movement, for `Committed` and `NotFound`
    pub fn event(&self) -> Option<&NavigationEvent> {
        match self {
            NavigationResult::Committed { event, .. } | NavigationResult::NotFound { event, .. } => {
                Some(event)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
