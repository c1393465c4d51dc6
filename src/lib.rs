//! # Navigator Core
//!
//! A framework-agnostic router core with support for:
//!
//! - **Route Trees** - Nested routes, index routes and pathless layouts with stable ids
//! - **Route Matching** - Static > dynamic > wildcard precedence with backtracking
//! - **Navigation State Machine** - Supersedable transitions committed as immutable snapshots
//! - **Loaders** - Concurrent async data loading with pending debounce and error boundaries
//! - **Links** - Hrefs, active-state detection, click and preload handlers
//! - **History, Blocking, Preloading** - In-memory history stack, navigation blockers and a
//!   preload cache
//!
//! Rendering is left to binding layers: the router only decides which opaque
//! [`Element`] to surface for a match.
//!
//! # Quick Start
//!
//! ```
//! use navigator_core::*;
//!
//! # pollster::block_on(async {
//! let router = Router::new(
//!     Route::root().children(vec![
//!         Route::new("/").element("Home"),
//!         Route::new("posts")
//!             .loader(|_ctx| async { Ok::<_, LoaderError>(vec!["hello", "world"]) })
//!             .children(vec![Route::new(":postId").element("Post")]),
//!     ]),
//!     RouterOptions::default(),
//! )
//! .unwrap();
//!
//! let subscription = router.subscribe(|state| {
//!     println!("now at {}", state.location);
//! });
//!
//! let result = router.navigate("/posts/5").await.unwrap();
//! assert!(result.is_committed());
//!
//! let state = router.state();
//! let post = state.leaf().unwrap();
//! assert_eq!(post.route_id, "/posts/:postId");
//! assert_eq!(post.params.get("postId"), Some("5"));
//!
//! let posts = state.get_match("/posts").unwrap();
//! assert_eq!(posts.data_as::<Vec<&str>>().unwrap().len(), 2);
//!
//! subscription.unsubscribe();
//! # });
//! ```
//!
//! # Links
//!
//! ```
//! use navigator_core::*;
//!
//! # pollster::block_on(async {
//! let router = Router::new(
//!     Route::root().child(Route::new("posts").child(Route::new(":postId"))),
//!     RouterOptions::default(),
//! )
//! .unwrap();
//! router.navigate("/posts/5").await.unwrap();
//!
//! let link = router.build_link(LinkOptions::new("/posts"));
//! assert_eq!(link.href, "/posts");
//! assert!(link.is_active);
//! assert!(!router.build_link(LinkOptions::new("/posts").exact(true)).is_active);
//! # });
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache for pathname -> match chain resolution
//!
//! Pending-element debouncing uses `tokio::time` when a tokio runtime is
//! running. Under any other executor loaders still run, but matches never
//! turn pending.

#![doc(html_root_url = "https://docs.rs/navigator-core/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Route tree and matching
pub mod location;
pub mod matcher;
pub mod params;
pub mod route;
pub mod tree;

// Navigation
pub mod history;
pub mod link;
mod loader;
pub mod outlet;
mod preload;
pub mod router;
pub mod state;
pub mod transition;

// Error handling
pub mod error;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, MatchCache};
pub use error::{LoaderError, NavigationError, NavigationResult, RouteTreeError};
pub use history::{History, NavigationEvent};
pub use link::{ActiveOptions, Link, LinkKind, LinkOptions};
pub use location::{interpolate_path, is_external, join_paths, resolve_path, Location};
pub use matcher::{match_path, match_path_with, ChainEntry, MatchChain, MatchOptions};
pub use outlet::Surface;
pub use params::{QueryParams, RouteParams};
pub use preload::DEFAULT_PRELOAD_MAX_AGE;
pub use route::{
    validate_route_path, Element, LoaderContext, LoaderData, Route, RouteOptions,
};
pub use router::{NavigateOptions, Router, RouterOptions, Subscription};
pub use state::{RouterState, RouterStatus};
pub use transition::{CancelFlag, Transition};
pub use tree::{RouteNode, RouteRef, RouteTreeIndex, ROOT_ROUTE_ID};

use std::any::Any;
use std::fmt;

/// Load status of a [`RouteMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Resolved, loader not started yet
    Idle,
    /// Loader in flight
    Loading,
    /// Loader settled successfully (or the route has no loader)
    Ready,
    /// Loader failed; the match carries the error
    Error,
}

#[derive(Clone)]
enum MatchState {
    Idle,
    Loading,
    Ready(Option<LoaderData>),
    Error(LoaderError),
}

/// A route node instantiated for one resolved location.
///
/// Data and error are mutually exclusive by construction: the match carries
/// data only when ready and an error only when failed.
///
/// # Example
///
/// ```
/// use navigator_core::{MatchStatus, RouteMatch, RouteParams};
///
/// let route_match = RouteMatch::new(
///     "/users/:id",
///     "/users/123",
///     RouteParams::new().with("id", "123"),
/// );
///
/// assert_eq!(route_match.params.get("id"), Some("123"));
/// assert_eq!(route_match.status(), MatchStatus::Idle);
/// ```
#[derive(Clone)]
pub struct RouteMatch {
    /// Id of the matched route
    pub route_id: String,
    /// URL portion matched from the root down to this route
    pub pathname: String,
    /// Params accumulated from the root down to this route
    pub params: RouteParams,
    state: MatchState,
    is_pending: bool,
}

impl RouteMatch {
    /// Create an idle match
    pub fn new(
        route_id: impl Into<String>,
        pathname: impl Into<String>,
        params: RouteParams,
    ) -> Self {
        Self {
            route_id: route_id.into(),
            pathname: pathname.into(),
            params,
            state: MatchState::Idle,
            is_pending: false,
        }
    }

    pub fn status(&self) -> MatchStatus {
        match self.state {
            MatchState::Idle => MatchStatus::Idle,
            MatchState::Loading => MatchStatus::Loading,
            MatchState::Ready(_) => MatchStatus::Ready,
            MatchState::Error(_) => MatchStatus::Error,
        }
    }

    /// Loader output; present only when ready and the route has a loader
    pub fn data(&self) -> Option<&LoaderData> {
        match &self.state {
            MatchState::Ready(data) => data.as_ref(),
            _ => None,
        }
    }

    /// Loader output downcast to `T`
    pub fn data_as<T: Any>(&self) -> Option<&T> {
        self.data()?.downcast_ref::<T>()
    }

    /// Loader failure; present only when status is [`MatchStatus::Error`]
    pub fn error(&self) -> Option<&LoaderError> {
        match &self.state {
            MatchState::Error(error) => Some(error),
            _ => None,
        }
    }

    /// True while the loader runs past its pending delay
    pub fn is_pending(&self) -> bool {
        self.is_pending
    }

    pub(crate) fn set_loading(&mut self) {
        self.state = MatchState::Loading;
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.is_pending = pending && matches!(self.state, MatchState::Idle | MatchState::Loading);
    }

    pub(crate) fn set_ready(&mut self, data: Option<LoaderData>) {
        self.state = MatchState::Ready(data);
        self.is_pending = false;
    }

    pub(crate) fn set_error(&mut self, error: LoaderError) {
        self.state = MatchState::Error(error);
        self.is_pending = false;
    }
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("route_id", &self.route_id)
            .field("pathname", &self.pathname)
            .field("params", &self.params)
            .field("status", &self.status())
            .field("error", &self.error())
            .field("is_pending", &self.is_pending)
            .finish_non_exhaustive()
    }
}

/// Navigation direction indicator.
///
/// Describes how a committed navigation moved through history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    /// Navigating forward to a new location
    Forward,
    /// Navigating back in history
    Back,
    /// Replacing the current entry without affecting history direction
    Replace,
}
