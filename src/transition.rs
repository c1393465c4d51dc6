//! Navigation transitions
//!
//! A [`Transition`] is one in-flight navigation attempt. It owns the matches
//! being loaded and a cooperative cancellation flag; the router sets the flag
//! when a newer navigation supersedes it and every continuation checks it
//! before touching shared state.

use crate::location::Location;
use crate::state::RouterState;
use crate::RouteMatch;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared, advisory cancellation flag.
///
/// Loaders are never aborted; a cancelled flag only tells continuations to
/// drop their results.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Rc<Cell<bool>>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// A set of matches loaded together, plus the flag that can void them.
#[derive(Debug)]
pub(crate) struct LoadBatch {
    cancel: CancelFlag,
    matches: RefCell<Vec<RouteMatch>>,
}

impl LoadBatch {
    pub fn new(matches: Vec<RouteMatch>, cancel: CancelFlag) -> Self {
        Self {
            cancel,
            matches: RefCell::new(matches),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Mutate one match unless the batch has been cancelled
    pub fn update(&self, index: usize, f: impl FnOnce(&mut RouteMatch)) {
        if self.is_cancelled() {
            return;
        }
        if let Some(route_match) = self.matches.borrow_mut().get_mut(index) {
            f(route_match);
        }
    }

    pub fn snapshot(&self) -> Vec<RouteMatch> {
        self.matches.borrow().clone()
    }
}

/// How a committed transition moves the history cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HistoryAction {
    Push,
    Replace,
    Back,
    Forward,
}

/// One navigation attempt
#[derive(Debug)]
pub struct Transition {
    id: u64,
    from_state: Rc<RouterState>,
    to_location: Location,
    pub(crate) action: HistoryAction,
    pub(crate) batch: LoadBatch,
}

impl Transition {
    pub(crate) fn new(
        id: u64,
        from_state: Rc<RouterState>,
        to_location: Location,
        matches: Vec<RouteMatch>,
        action: HistoryAction,
    ) -> Self {
        Self {
            id,
            from_state,
            to_location,
            action,
            batch: LoadBatch::new(matches, CancelFlag::new()),
        }
    }

    /// Monotonic id, unique per router
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Last committed state when the transition began
    pub fn from_state(&self) -> &Rc<RouterState> {
        &self.from_state
    }

    /// Navigation target
    pub fn to_location(&self) -> &Location {
        &self.to_location
    }

    /// Mark superseded
    pub fn cancel(&self) {
        self.batch.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.batch.is_cancelled()
    }

    /// Current view of the matches being loaded
    pub fn matches(&self) -> Vec<RouteMatch> {
        self.batch.snapshot()
    }
}
