//! Router handle and navigation state machine
//!
//! [`Router`] owns the route tree index, the live [`RouterState`], the
//! in-flight [`Transition`] and every registered observer. It is a cheap,
//! clonable, single-threaded handle: clones share one router.
//!
//! # Navigation lifecycle
//!
//! ```text
//! navigate(to)
//!   ├─ blocked?             -> Ok(Blocked), nothing changes
//!   ├─ begin transition     -> supersedes any in-flight one, state = Transitioning
//!   ├─ load matches         -> loaders run concurrently
//!   ├─ superseded meanwhile -> Ok(Superseded), results dropped
//!   ├─ unhandled error      -> state reverted, Err(UnhandledLoaderError)
//!   └─ commit               -> new state, history moves, subscribers notified
//! ```

use crate::error::{NavigationError, NavigationResult, RouteTreeError};
use crate::history::History;
use crate::link::{ActiveOptions, Link, LinkKind, LinkOptions};
use crate::loader::{load_matches, LoadJob};
use crate::location::{interpolate_path, is_external, resolve_path, Location};
use crate::matcher::{match_path_with, MatchChain, MatchOptions};
use crate::outlet::{self, Surface};
use crate::params::{QueryParams, RouteParams};
use crate::preload::{PreloadCache, DEFAULT_PRELOAD_MAX_AGE};
use crate::route::{Element, LoaderContext, Route};
use crate::state::RouterState;
use crate::transition::{CancelFlag, HistoryAction, LoadBatch, Transition};
use crate::tree::{RouteRef, RouteTreeIndex, ROOT_ROUTE_ID};
use crate::{debug_log, error_log, info_log, RouteMatch};
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, MatchCache};

// ============================================================================
// RouterOptions
// ============================================================================

/// Router-wide configuration
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Case sensitivity for routes that don't set their own
    pub case_sensitive: bool,
    /// Pending delay for routes that don't set their own
    pub default_pending_ms: Option<Duration>,
    /// Treat the router itself as an error boundary
    pub use_error_boundary: bool,
    pub default_element: Option<Element>,
    /// Also makes the router an error boundary
    pub default_error_element: Option<Element>,
    pub default_pending_element: Option<Element>,
    /// Freshness window for preloaded data
    pub preload_max_age: Duration,
    pub match_cache_capacity: usize,
    /// Maximum history entries (0 = unlimited)
    pub history_max_size: usize,
    pub initial_location: Location,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            default_pending_ms: None,
            use_error_boundary: false,
            default_element: None,
            default_error_element: None,
            default_pending_element: None,
            preload_max_age: DEFAULT_PRELOAD_MAX_AGE,
            match_cache_capacity: 1000,
            history_max_size: History::DEFAULT_MAX_SIZE,
            initial_location: Location::new("/"),
        }
    }
}

impl RouterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn default_pending_ms(mut self, pending: Duration) -> Self {
        self.default_pending_ms = Some(pending);
        self
    }

    pub fn use_error_boundary(mut self, enabled: bool) -> Self {
        self.use_error_boundary = enabled;
        self
    }

    pub fn default_element<T: Any>(mut self, element: T) -> Self {
        self.default_element = Some(Element::new(element));
        self
    }

    pub fn default_error_element<T: Any>(mut self, element: T) -> Self {
        self.default_error_element = Some(Element::new(element));
        self
    }

    pub fn default_pending_element<T: Any>(mut self, element: T) -> Self {
        self.default_pending_element = Some(Element::new(element));
        self
    }

    pub fn preload_max_age(mut self, max_age: Duration) -> Self {
        self.preload_max_age = max_age;
        self
    }

    pub fn match_cache_capacity(mut self, capacity: usize) -> Self {
        self.match_cache_capacity = capacity;
        self
    }

    pub fn history_max_size(mut self, max_size: usize) -> Self {
        self.history_max_size = max_size;
        self
    }

    pub fn initial_location(mut self, location: impl Into<Location>) -> Self {
        self.initial_location = location.into();
        self
    }

    fn is_error_boundary(&self) -> bool {
        self.use_error_boundary || self.default_error_element.is_some()
    }
}

// ============================================================================
// NavigateOptions
// ============================================================================

/// A navigation request
///
/// `to` may be absolute (`/posts`), relative (`..`, `./new`) and may carry
/// `:param` placeholders, a search string and a hash.
///
/// # Example
///
/// ```
/// use navigator_core::NavigateOptions;
///
/// let request = NavigateOptions::new("/posts/:postId").param("postId", "5");
/// assert_eq!(request.to, "/posts/:postId");
/// assert_eq!(request.params.get("postId"), Some("5"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NavigateOptions {
    pub to: String,
    /// Route id relative targets resolve against; defaults to the current location
    pub from: Option<String>,
    pub params: RouteParams,
    /// Overrides any search string in `to`
    pub search: Option<QueryParams>,
    /// Overrides any hash in `to`
    pub hash: Option<String>,
    /// Replace the current history entry instead of pushing
    pub replace: bool,
}

impl NavigateOptions {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            ..Self::default()
        }
    }

    pub fn from_route(mut self, route_id: impl Into<String>) -> Self {
        self.from = Some(route_id.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn search(mut self, search: QueryParams) -> Self {
        self.search = Some(search);
        self
    }

    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

impl From<&str> for NavigateOptions {
    fn from(to: &str) -> Self {
        Self::new(to)
    }
}

impl From<String> for NavigateOptions {
    fn from(to: String) -> Self {
        Self::new(to)
    }
}

impl From<Location> for NavigateOptions {
    fn from(location: Location) -> Self {
        Self::new(location.href())
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

type Listener = Rc<dyn Fn(&Rc<RouterState>)>;
type Blocker = Rc<dyn Fn(&Location, &Location) -> bool>;
type Cleanup = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubscriptionKind {
    Listener,
    Blocker,
}

/// Handle returned by [`Router::subscribe`] and [`Router::block`]
///
/// Dropping the handle keeps the registration; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
pub struct Subscription {
    id: u64,
    kind: SubscriptionKind,
    router: Weak<RefCell<Inner>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        let Some(inner) = self.router.upgrade() else {
            return;
        };
        let mut inner = inner.borrow_mut();
        match self.kind {
            SubscriptionKind::Listener => inner.listeners.retain(|(id, _)| *id != self.id),
            SubscriptionKind::Blocker => inner.blockers.retain(|(id, _)| *id != self.id),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

// ============================================================================
// Router
// ============================================================================

struct Inner {
    index: RouteTreeIndex,
    options: RouterOptions,
    /// Live state, possibly transitioning
    state: Rc<RouterState>,
    /// Last committed state; what a fatal failure reverts to
    committed: Rc<RouterState>,
    transition: Option<Rc<Transition>>,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
    blockers: Vec<(u64, Blocker)>,
    cleanups: Vec<Cleanup>,
    history: History,
    preloads: PreloadCache,
    #[cfg(feature = "cache")]
    match_cache: MatchCache,
}

/// Router handle
///
/// # Example
///
/// ```
/// use navigator_core::{Route, Router, RouterOptions};
///
/// # pollster::block_on(async {
/// let router = Router::new(
///     Route::root().children(vec![Route::new("/"), Route::new("about")]),
///     RouterOptions::default(),
/// )
/// .unwrap();
///
/// router.navigate("/about").await.unwrap();
/// assert_eq!(router.state().location.pathname, "/about");
///
/// router.back().await.unwrap().unwrap();
/// assert_eq!(router.state().location.pathname, "/");
/// # });
/// ```
#[derive(Clone)]
pub struct Router {
    inner: Rc<RefCell<Inner>>,
}

impl Router {
    /// Validate `tree` and create an idle router at the initial location
    ///
    /// The initial state has no matches; call [`load`](Self::load) to
    /// resolve and load the initial location.
    pub fn new(tree: Route, options: RouterOptions) -> Result<Self, RouteTreeError> {
        let index = RouteTreeIndex::build(tree)?;
        let initial = options.initial_location.clone();
        let state = Rc::new(RouterState::new(initial.clone()));
        info_log!("router created with {} routes at '{}'", index.len(), initial);

        let inner = Inner {
            #[cfg(feature = "cache")]
            match_cache: MatchCache::with_capacity(options.match_cache_capacity),
            history: History::with_max_size(initial, options.history_max_size),
            index,
            options,
            committed: state.clone(),
            state,
            transition: None,
            next_id: 0,
            listeners: Vec::new(),
            blockers: Vec::new(),
            cleanups: Vec::new(),
            preloads: PreloadCache::default(),
        };

        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
        })
    }

    /// Current state snapshot
    pub fn state(&self) -> Rc<RouterState> {
        self.inner.borrow().state.clone()
    }

    /// Matches of the in-flight transition, if any
    ///
    /// Reflects loading progress (status, `is_pending`) without notifying
    /// subscribers.
    pub fn pending_matches(&self) -> Option<Vec<RouteMatch>> {
        self.inner.borrow().transition.as_ref().map(|t| t.matches())
    }

    /// Look up a route by id
    pub fn get_route(&self, route_id: &str) -> Option<RouteRef> {
        self.inner.borrow().index.get(route_id).cloned()
    }

    /// Resolve a relative route id against `from_id`
    ///
    /// Returns `None` when either id is unknown.
    ///
    /// ```
    /// use navigator_core::{Route, Router, RouterOptions};
    ///
    /// let router = Router::new(
    ///     Route::root().child(Route::new("posts").children(vec![
    ///         Route::new("/"),
    ///         Route::new(":postId"),
    ///     ])),
    ///     RouterOptions::default(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(router.resolve_path("/posts/:postId", "..").as_deref(), Some("/posts"));
    /// assert_eq!(router.resolve_path("/posts", "./").as_deref(), Some("/posts/"));
    /// assert_eq!(router.resolve_path("/posts", "missing"), None);
    /// ```
    pub fn resolve_path(&self, from_id: &str, to: &str) -> Option<String> {
        let inner = self.inner.borrow();
        let from = inner.index.get(from_id)?;
        let target = resolve_path(from.full_path(), to);

        if inner.index.get(&target).is_some() {
            Some(target)
        } else if target == "/" {
            Some(ROOT_ROUTE_ID.to_string())
        } else {
            None
        }
    }

    /// Resolve a pathname to a match chain without navigating
    pub fn match_pathname(&self, pathname: &str) -> Option<MatchChain> {
        self.inner.borrow_mut().resolve_chain(pathname)
    }

    /// Register a listener called after every committed transition
    ///
    /// Listeners run synchronously, in registration order, exactly once per
    /// commit.
    pub fn subscribe(&self, listener: impl Fn(&Rc<RouterState>) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.listeners.push((id, Rc::new(listener)));
        self.subscription(id, SubscriptionKind::Listener)
    }

    /// Register a blocker; `predicate(from, to)` returning `true` denies the navigation
    ///
    /// Blockers are released on the next committed transition.
    pub fn block(&self, predicate: impl Fn(&Location, &Location) -> bool + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id();
        inner.blockers.push((id, Rc::new(predicate)));
        self.subscription(id, SubscriptionKind::Blocker)
    }

    /// Register a cleanup run once on the next committed transition
    pub fn register_cleanup(&self, cleanup: impl FnOnce() + 'static) {
        self.inner.borrow_mut().cleanups.push(Box::new(cleanup));
    }

    fn subscription(&self, id: u64, kind: SubscriptionKind) -> Subscription {
        Subscription {
            id,
            kind,
            router: Rc::downgrade(&self.inner),
        }
    }

    /// Navigate to a new location
    ///
    /// Settles when the transition commits, is superseded, is blocked, or
    /// fails with an unhandled loader error.
    pub async fn navigate(
        &self,
        options: impl Into<NavigateOptions>,
    ) -> Result<NavigationResult, NavigationError> {
        let options = options.into();
        let location = self.inner.borrow().build_location(&options);
        let action = if options.replace {
            HistoryAction::Replace
        } else {
            HistoryAction::Push
        };
        self.run(location, action).await
    }

    /// Resolve and load the current location, replacing the history entry
    pub async fn load(&self) -> Result<NavigationResult, NavigationError> {
        let location = self.inner.borrow().history.current().clone();
        self.run(location, HistoryAction::Replace).await
    }

    /// Navigate one entry back; `None` at the start of history
    pub async fn back(&self) -> Option<Result<NavigationResult, NavigationError>> {
        let location = self.inner.borrow().history.peek_back().cloned()?;
        Some(self.run(location, HistoryAction::Back).await)
    }

    /// Navigate one entry forward; `None` at the end of history
    pub async fn forward(&self) -> Option<Result<NavigationResult, NavigationError>> {
        let location = self.inner.borrow().history.peek_forward().cloned()?;
        Some(self.run(location, HistoryAction::Forward).await)
    }

    pub fn can_go_back(&self) -> bool {
        self.inner.borrow().history.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.inner.borrow().history.can_go_forward()
    }

    /// Copy of the history stack
    pub fn history(&self) -> History {
        self.inner.borrow().history.clone()
    }

    /// Run the loaders of a target without committing
    ///
    /// Successful loader data is cached for the route's preload max age and
    /// consumed by the next navigation to the same route and pathname.
    /// Returns the loaded matches; empty when nothing matches.
    pub async fn preload(&self, options: impl Into<NavigateOptions>) -> Vec<RouteMatch> {
        let options = options.into();
        let (batch, jobs, reused) = {
            let mut inner = self.inner.borrow_mut();
            let location = inner.build_location(&options);
            let Some(chain) = inner.resolve_chain(&location.pathname) else {
                return Vec::new();
            };
            debug_log!("preloading '{}'", location);
            let matches = build_matches(&chain);
            let jobs = inner.load_jobs(&matches, &location, true);
            let reused: Vec<bool> = jobs.iter().map(|job| job.preloaded.is_some()).collect();
            (LoadBatch::new(matches, CancelFlag::new()), jobs, reused)
        };

        load_matches(&batch, jobs).await;

        let matches = batch.snapshot();
        let mut inner = self.inner.borrow_mut();
        for (route_match, reused) in matches.iter().zip(reused) {
            let Some(data) = route_match.data() else {
                continue;
            };
            let Some(route) = inner.index.get(&route_match.route_id) else {
                continue;
            };
            if reused || !route.has_loader() {
                continue;
            }
            let max_age = route
                .options()
                .preload_max_age
                .unwrap_or(inner.options.preload_max_age);
            inner
                .preloads
                .insert(&route_match.route_id, &route_match.pathname, data.clone(), max_age);
        }
        matches
    }

    /// Decide which element a binding layer should show for `route_match`
    pub fn surface(&self, route_match: &RouteMatch) -> Surface {
        let inner = self.inner.borrow();
        let Some(route) = inner.index.get(&route_match.route_id) else {
            return Surface::Nothing;
        };
        let contained = inner.options.use_error_boundary
            || inner.index.has_error_boundary(&route_match.route_id);
        outlet::surface(route, route_match, &inner.options, contained)
    }

    /// Project link options into an href, active flag and handlers
    pub fn build_link(&self, options: impl Into<LinkOptions>) -> Link {
        let options = options.into();
        if is_external(&options.to) {
            return Link::new(
                LinkKind::External,
                options.to.clone(),
                false,
                &options,
                self.clone(),
            );
        }

        let (href, is_active) = {
            let mut inner = self.inner.borrow_mut();
            let location = inner.build_location(&options.navigate_options());
            let is_active = inner.is_active(&location, options.active_options);
            (location.href(), is_active)
        };
        Link::new(LinkKind::Internal, href, is_active, &options, self.clone())
    }

    /// Match cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.borrow().match_cache.stats().clone()
    }

    async fn run(
        &self,
        location: Location,
        action: HistoryAction,
    ) -> Result<NavigationResult, NavigationError> {
        let href = location.href();
        let Some((transition, jobs)) = self.begin(location, action) else {
            return Ok(NavigationResult::Blocked { to: href });
        };

        load_matches(&transition.batch, jobs).await;

        if transition.is_cancelled() {
            debug_log!("transition #{} superseded", transition.id());
            return Ok(NavigationResult::Superseded);
        }

        if let Some(error) = self.unhandled_error(&transition) {
            self.revert(&transition);
            return Err(error);
        }

        Ok(self.commit(&transition))
    }

    /// Start a transition; `None` when a blocker denies it
    fn begin(&self, location: Location, action: HistoryAction) -> Option<(Rc<Transition>, Vec<LoadJob>)> {
        // Blockers may read the router, so they run without a borrow held.
        let (from, blockers) = {
            let inner = self.inner.borrow();
            let blockers: Vec<Blocker> = inner.blockers.iter().map(|(_, b)| b.clone()).collect();
            (inner.committed.location.clone(), blockers)
        };
        if blockers.iter().any(|blocker| blocker(&from, &location)) {
            debug_log!("navigation to '{}' blocked", location);
            return None;
        }

        let mut inner = self.inner.borrow_mut();

        if let Some(previous) = inner.transition.take() {
            previous.cancel();
            debug_log!(
                "transition #{} superseded by navigation to '{}'",
                previous.id(),
                location
            );
        }

        let chain = inner.resolve_chain(&location.pathname);
        let matches = chain.as_ref().map(build_matches).unwrap_or_default();
        let jobs = inner.load_jobs(&matches, &location, false);

        let id = inner.next_id();
        let transition = Rc::new(Transition::new(
            id,
            inner.committed.clone(),
            location.clone(),
            matches,
            action,
        ));
        debug_log!("transition #{} to '{}' started", id, location);

        inner.state = Rc::new(inner.committed.transitioning(location));
        inner.transition = Some(transition.clone());
        Some((transition, jobs))
    }

    fn unhandled_error(&self, transition: &Transition) -> Option<NavigationError> {
        let inner = self.inner.borrow();
        if inner.options.is_error_boundary() {
            return None;
        }
        transition.matches().into_iter().find_map(|route_match| {
            let error = route_match.error()?.clone();
            if inner.index.has_error_boundary(&route_match.route_id) {
                return None;
            }
            error_log!(
                "unhandled loader error in route '{}': {}",
                route_match.route_id,
                error
            );
            Some(NavigationError::UnhandledLoaderError {
                route_id: route_match.route_id,
                error,
            })
        })
    }

    fn revert(&self, transition: &Transition) {
        let mut inner = self.inner.borrow_mut();
        inner.state = transition.from_state().clone();
        inner.transition = None;
        debug_log!("transition #{} reverted to '{}'", transition.id(), inner.state.location);
    }

    fn commit(&self, transition: &Transition) -> NavigationResult {
        let (state, event, listeners, cleanups) = {
            let mut inner = self.inner.borrow_mut();
            let location = transition.to_location().clone();
            let state = Rc::new(RouterState::committed(location.clone(), transition.matches()));

            let action = match transition.action {
                HistoryAction::Push if *inner.history.current() == location => HistoryAction::Replace,
                action => action,
            };
            let moved = match action {
                HistoryAction::Push => Some(inner.history.push(location.clone())),
                HistoryAction::Replace => Some(inner.history.replace(location.clone())),
                HistoryAction::Back => inner.history.back(),
                HistoryAction::Forward => inner.history.forward(),
            };
            // The cursor can no longer move that way; keep the target as the current entry
            let event = match moved {
                Some(event) => event,
                None => inner.history.replace(location),
            };

            inner.state = state.clone();
            inner.committed = state.clone();
            inner.transition = None;
            inner.blockers.clear();
            inner.preloads.prune();
            debug_log!(
                "transition #{} committed at '{}' with {} matches",
                transition.id(),
                state.location,
                state.matches.len()
            );

            let listeners: Vec<Listener> = inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (state, event, listeners, std::mem::take(&mut inner.cleanups))
        };

        for cleanup in cleanups {
            cleanup();
        }
        for listener in listeners {
            listener(&state);
        }

        if state.matches.is_empty() {
            NavigationResult::NotFound { state, event }
        } else {
            NavigationResult::Committed { state, event }
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Router")
            .field("index", &inner.index)
            .field("state", &inner.state)
            .field("listeners", &inner.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve_chain(&mut self, pathname: &str) -> Option<MatchChain> {
        #[cfg(feature = "cache")]
        {
            if let Some(chain) = self.match_cache.get(cache_key(pathname)) {
                return chain;
            }
        }

        let chain = match_path_with(
            &self.index,
            pathname,
            MatchOptions {
                case_sensitive: self.options.case_sensitive,
            },
        );

        #[cfg(feature = "cache")]
        self.match_cache.insert(cache_key(pathname), chain.clone());

        chain
    }

    /// Resolve navigation options against the current state
    fn build_location(&self, options: &NavigateOptions) -> Location {
        let (rest, hash) = match options.to.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash)),
            None => (options.to.as_str(), None),
        };
        let (path, search) = rest.split_once('?').unwrap_or((rest, ""));
        let current = &self.state.location;

        let base = options
            .from
            .as_deref()
            .and_then(|id| self.index.get(id))
            .map_or_else(|| current.pathname.clone(), |route| route.full_path().to_string());

        let pathname = if path.is_empty() {
            current.pathname.clone()
        } else {
            let mut params = self
                .state
                .leaf()
                .map(|leaf| leaf.params.clone())
                .unwrap_or_default();
            params.extend(&options.params);
            interpolate_path(&resolve_path(&base, path), &params)
        };

        let search = options
            .search
            .clone()
            .unwrap_or_else(|| QueryParams::parse(search));
        let hash = options
            .hash
            .clone()
            .or_else(|| hash.map(str::to_string))
            .unwrap_or_default();

        Location::new(pathname).with_search(search).with_hash(hash)
    }

    fn load_jobs(&mut self, matches: &[RouteMatch], location: &Location, preload: bool) -> Vec<LoadJob> {
        let mut jobs = Vec::with_capacity(matches.len());
        for (index, route_match) in matches.iter().enumerate() {
            let Some(route) = self.index.get(&route_match.route_id).cloned() else {
                continue;
            };

            let preloaded = if !route.has_loader() {
                None
            } else if preload {
                self.preloads.get_fresh(route.id(), &route_match.pathname)
            } else {
                self.preloads.take_fresh(route.id(), &route_match.pathname)
            };
            let pending_after = if preload {
                None
            } else {
                route.options().pending_ms.or(self.options.default_pending_ms)
            };

            jobs.push(LoadJob {
                index,
                loader: route.loader().cloned(),
                context: LoaderContext {
                    route_id: route_match.route_id.clone(),
                    pathname: route_match.pathname.clone(),
                    params: route_match.params.clone(),
                    location: location.clone(),
                    preload,
                },
                pending_after,
                preloaded,
            });
        }
        jobs
    }

    fn is_active(&mut self, target: &Location, options: ActiveOptions) -> bool {
        if options.include_hash && self.state.location.hash != target.hash {
            return false;
        }
        let Some(chain) = self.resolve_chain(&target.pathname) else {
            return false;
        };
        let target_matches = build_matches(&chain);
        let current = &self.state.matches;

        if options.exact {
            return target_matches.len() == current.len()
                && target_matches
                    .iter()
                    .zip(current)
                    .all(|(a, b)| a.route_id == b.route_id && a.params == b.params);
        }

        let Some(anchor) = anchor(&target_matches) else {
            return false;
        };
        current
            .iter()
            .any(|m| m.route_id == anchor.route_id && m.params == anchor.params)
    }
}

#[cfg(feature = "cache")]
fn cache_key(pathname: &str) -> &str {
    match pathname.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Turn a chain into idle matches carrying accumulated params
fn build_matches(chain: &MatchChain) -> Vec<RouteMatch> {
    let mut params = RouteParams::new();
    chain
        .entries()
        .iter()
        .map(|entry| {
            params.extend(&entry.params);
            RouteMatch::new(&entry.route_id, &entry.pathname, params.clone())
        })
        .collect()
}

/// Deepest match that consumes path, skipping trailing index routes and layouts
fn anchor(matches: &[RouteMatch]) -> Option<&RouteMatch> {
    let mut end = matches.len();
    while end > 1 && matches[end - 1].pathname == matches[end - 2].pathname {
        end -= 1;
    }
    end.checked_sub(1).map(|i| &matches[i])
}
