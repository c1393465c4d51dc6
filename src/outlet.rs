//! Element surfacing
//!
//! Decides which opaque [`Element`] a binding layer should show for a match,
//! given its status. The router never renders anything itself.

use crate::error::LoaderError;
use crate::route::Element;
use crate::router::RouterOptions;
use crate::tree::RouteNode;
use crate::{MatchStatus, RouteMatch};

/// What to show for one match
#[derive(Debug, Clone)]
pub enum Surface {
    /// Ready: the route's element (or the router default)
    Element(Element),
    /// Loader running past its pending delay
    Pending(Element),
    /// Loader failed and an error element is available
    Error { element: Element, error: LoaderError },
    /// Loader failed without an error element; hand the error to the
    /// nearest ancestor boundary
    Propagate(LoaderError),
    /// Nothing to show
    Nothing,
}

impl Surface {
    /// The element to show, if any
    pub fn element(&self) -> Option<&Element> {
        match self {
            Surface::Element(element) | Surface::Pending(element) => Some(element),
            Surface::Error { element, .. } => Some(element),
            Surface::Propagate(_) | Surface::Nothing => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Surface::Nothing)
    }
}

/// `contained` tells whether the route, an ancestor or the router is an error boundary
pub(crate) fn surface(
    route: &RouteNode,
    route_match: &RouteMatch,
    options: &RouterOptions,
    contained: bool,
) -> Surface {
    match route_match.status() {
        MatchStatus::Error => {
            let Some(error) = route_match.error().cloned() else {
                return Surface::Nothing;
            };
            match route.error_element().or(options.default_error_element.as_ref()) {
                Some(element) => Surface::Error {
                    element: element.clone(),
                    error,
                },
                None if contained => Surface::Propagate(error),
                None => Surface::Nothing,
            }
        }
        MatchStatus::Idle | MatchStatus::Loading if route_match.is_pending() => route
            .pending_element()
            .or(options.default_pending_element.as_ref())
            .map_or(Surface::Nothing, |element| Surface::Pending(element.clone())),
        MatchStatus::Idle | MatchStatus::Loading => Surface::Nothing,
        MatchStatus::Ready => route
            .element()
            .or(options.default_element.as_ref())
            .map_or(Surface::Nothing, |element| Surface::Element(element.clone())),
    }
}
