//! Route definition and configuration
//!
//! [`Route`] is the builder applications use to describe the route tree. It is
//! consumed by [`RouteTreeIndex::build`](crate::RouteTreeIndex::build), which
//! validates it and turns every route into an immutable
//! [`RouteNode`](crate::RouteNode).

use crate::error::{LoaderError, RouteTreeError};
use crate::location::Location;
use crate::params::RouteParams;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

// ============================================================================
// Opaque values
// ============================================================================

/// Opaque data produced by a loader.
pub type LoaderData = Rc<dyn Any>;

/// Future returned by a type-erased loader.
pub type LoaderFuture = LocalBoxFuture<'static, Result<LoaderData, LoaderError>>;

/// Type-erased loader callable.
pub type LoaderFn = Rc<dyn Fn(LoaderContext) -> LoaderFuture>;

/// Opaque renderable reference.
///
/// The router never renders elements; it only decides which one a binding
/// layer should show for a match. Bindings downcast back to their own type.
///
/// # Example
///
/// ```
/// use navigator_core::Element;
///
/// let element = Element::new("PostsPage");
/// assert_eq!(element.downcast_ref::<&str>(), Some(&"PostsPage"));
/// ```
#[derive(Clone)]
pub struct Element(Rc<dyn Any>);

impl Element {
    /// Wrap any value as an element reference
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Borrow the wrapped value as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether two handles point at the same element
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Element(..)")
    }
}

/// Input handed to a loader.
#[derive(Debug, Clone)]
pub struct LoaderContext {
    /// Id of the route being loaded
    pub route_id: String,
    /// Portion of the URL matched by this route
    pub pathname: String,
    /// Params accumulated from the root down to this route
    pub params: RouteParams,
    /// Full target location (search and hash included)
    pub location: Location,
    /// True when the load is a preload rather than a navigation
    pub preload: bool,
}

// ============================================================================
// Route Validation
// ============================================================================

/// Split a path into its non-empty segments
pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Validate a route path template
///
/// # Validation Rules
///
/// - Path can be empty or `/` (index routes)
/// - No consecutive slashes (`//`)
/// - Parameter names must be non-empty alphanumeric/underscore
/// - Constraints must be closed (`:id<\d+>`)
/// - A wildcard `*` may only be the last segment
/// - No duplicate parameter names
pub fn validate_route_path(path: &str) -> Result<(), RouteTreeError> {
    let invalid = |reason: String| RouteTreeError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    if path.contains("//") {
        return Err(invalid("consecutive slashes".to_string()));
    }

    let segments: Vec<&str> = split_segments(path).collect();
    let mut param_names = HashSet::new();

    for (i, segment) in segments.iter().enumerate() {
        if *segment == "*" {
            if i + 1 != segments.len() {
                return Err(invalid("wildcard must be the last segment".to_string()));
            }
            continue;
        }

        let Some(param) = segment.strip_prefix(':') else {
            continue;
        };

        let name = match param.find('<') {
            Some(pos) => {
                if !param.ends_with('>') {
                    return Err(invalid(format!("unclosed constraint in '{}'", segment)));
                }
                &param[..pos]
            }
            None => param,
        };

        if name.is_empty() {
            return Err(invalid("parameter name cannot be empty".to_string()));
        }

        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(invalid(format!(
                "parameter '{}' must contain only alphanumeric characters and underscores",
                name
            )));
        }

        if !param_names.insert(name) {
            return Err(invalid(format!("duplicate parameter '{}'", name)));
        }
    }

    Ok(())
}

// ============================================================================
// RouteOptions
// ============================================================================

/// Per-route behaviour switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteOptions {
    /// Compare static segments case-sensitively; `None` inherits the router default
    pub case_sensitive: Option<bool>,
    /// Delay before an unsettled loader flips the match to pending
    pub pending_ms: Option<Duration>,
    /// Declare this route an error boundary for its own and descendant loaders
    pub use_error_boundary: bool,
    /// How long preloaded data for this route stays fresh
    pub preload_max_age: Option<Duration>,
}

// ============================================================================
// Route
// ============================================================================

/// Route definition
///
/// # Example
///
/// ```
/// use navigator_core::{LoaderError, Route};
///
/// let tree = Route::root().children(vec![
///     Route::new("/").element("Index"),
///     Route::new("posts")
///         .loader(|_ctx| async { Ok::<_, LoaderError>(vec!["first post"]) })
///         .error_element("PostsError")
///         .children(vec![
///             Route::new("/").element("PostsIndex"),
///             Route::new(":postId").element("Post"),
///         ]),
/// ]);
/// # let _ = tree;
/// ```
pub struct Route {
    pub(crate) id: Option<String>,
    pub(crate) path: Option<String>,
    pub(crate) children: Vec<Route>,
    pub(crate) loader: Option<LoaderFn>,
    pub(crate) element: Option<Element>,
    pub(crate) error_element: Option<Element>,
    pub(crate) pending_element: Option<Element>,
    pub(crate) options: RouteOptions,
}

impl Route {
    /// The root route. Its id is [`ROOT_ROUTE_ID`](crate::ROOT_ROUTE_ID).
    pub fn root() -> Self {
        Self::with_path(Some("/".to_string()))
    }

    /// A route matching `path`, relative to its parent
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_path(Some(path.into()))
    }

    /// A pathless layout route; it consumes no segments and needs an id
    pub fn layout(id: impl Into<String>) -> Self {
        let mut route = Self::with_path(None);
        route.id = Some(id.into());
        route
    }

    fn with_path(path: Option<String>) -> Self {
        Self {
            id: None,
            path,
            children: Vec::new(),
            loader: None,
            element: None,
            error_element: None,
            pending_element: None,
            options: RouteOptions::default(),
        }
    }

    /// Override the id derived from the path
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace the child routes; registration order is kept
    pub fn children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }

    /// Append a child route
    pub fn child(mut self, child: Route) -> Self {
        self.children.push(child);
        self
    }

    /// Attach an async loader
    ///
    /// The loader's output is stored type-erased on the match; read it back
    /// with [`RouteMatch::data_as`](crate::RouteMatch::data_as).
    pub fn loader<F, Fut, T>(mut self, loader: F) -> Self
    where
        F: Fn(LoaderContext) -> Fut + 'static,
        Fut: Future<Output = Result<T, LoaderError>> + 'static,
        T: Any,
    {
        self.loader = Some(Rc::new(move |ctx| {
            loader(ctx)
                .map(|result| result.map(|data| Rc::new(data) as LoaderData))
                .boxed_local()
        }));
        self
    }

    /// Element shown when the match is ready
    pub fn element<T: Any>(mut self, element: T) -> Self {
        self.element = Some(Element::new(element));
        self
    }

    /// Element shown when the loader failed; also makes this route an error boundary
    pub fn error_element<T: Any>(mut self, element: T) -> Self {
        self.error_element = Some(Element::new(element));
        self
    }

    /// Element shown while the match is pending
    pub fn pending_element<T: Any>(mut self, element: T) -> Self {
        self.pending_element = Some(Element::new(element));
        self
    }

    /// Replace all options at once
    pub fn options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    /// Case-sensitive static segment matching for this route
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.options.case_sensitive = Some(case_sensitive);
        self
    }

    /// Pending debounce for this route's loader
    pub fn pending_ms(mut self, pending: Duration) -> Self {
        self.options.pending_ms = Some(pending);
        self
    }

    /// Declare this route an error boundary
    pub fn use_error_boundary(mut self, enabled: bool) -> Self {
        self.options.use_error_boundary = enabled;
        self
    }

    /// Freshness window for preloaded data of this route
    pub fn preload_max_age(mut self, max_age: Duration) -> Self {
        self.options.preload_max_age = Some(max_age);
        self
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("children", &self.children.len())
            .field("loader", &self.loader.is_some())
            .field("options", &self.options)
            .finish()
    }
}
