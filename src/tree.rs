//! Route tree index
//!
//! Flattens a [`Route`] tree into an arena of immutable [`RouteNode`]s. Parent
//! links are stored as ids (no ownership), children as arena indices, and each
//! node carries a precomputed, precedence-ordered list of match candidates.
//! The index is read-only once built; a changed tree needs a fresh index.

use crate::error::RouteTreeError;
use crate::location::join_paths;
use crate::matcher::{Segment, SegmentRank};
use crate::route::{validate_route_path, Element, LoaderFn, Route, RouteOptions};
use crate::debug_log;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Id of the root route.
pub const ROOT_ROUTE_ID: &str = "__root__";

/// Position of a node in the index arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// Shared handle to an indexed route.
pub type RouteRef = Rc<RouteNode>;

/// Immutable, indexed description of one route.
pub struct RouteNode {
    id: String,
    path: Option<String>,
    full_path: String,
    parent_id: Option<String>,
    child_ids: Vec<String>,
    pub(crate) segments: Vec<Segment>,
    loader: Option<LoaderFn>,
    element: Option<Element>,
    error_element: Option<Element>,
    pending_element: Option<Element>,
    options: RouteOptions,
}

impl RouteNode {
    /// Unique id within the tree
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path template as registered; `None` for pathless layouts
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Template joined with every ancestor's template
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Id of the parent route; `None` only for the root
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Child ids in registration order
    pub fn child_ids(&self) -> &[String] {
        &self.child_ids
    }

    /// Whether a loader is attached
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    pub(crate) fn loader(&self) -> Option<&LoaderFn> {
        self.loader.as_ref()
    }

    /// Element shown when ready
    pub fn element(&self) -> Option<&Element> {
        self.element.as_ref()
    }

    /// Element shown on loader failure
    pub fn error_element(&self) -> Option<&Element> {
        self.error_element.as_ref()
    }

    /// Element shown while pending
    pub fn pending_element(&self) -> Option<&Element> {
        self.pending_element.as_ref()
    }

    /// Route options
    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// Whether this route consumes no path segments
    pub fn is_pathless(&self) -> bool {
        self.path.is_none()
    }

    /// Whether this route contains loader failures of itself and its descendants
    pub fn is_error_boundary(&self) -> bool {
        self.error_element.is_some() || self.options.use_error_boundary
    }

    pub(crate) fn case_sensitive(&self, default: bool) -> bool {
        self.options.case_sensitive.unwrap_or(default)
    }
}

impl fmt::Debug for RouteNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteNode")
            .field("id", &self.id)
            .field("full_path", &self.full_path)
            .field("parent_id", &self.parent_id)
            .field("children", &self.child_ids)
            .field("loader", &self.loader.is_some())
            .field("options", &self.options)
            .finish()
    }
}

/// A child reachable from a node, possibly through pathless layouts.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub via: Vec<NodeId>,
    pub node: NodeId,
    pub rank: SegmentRank,
    /// Rank of every segment, terminated by `Index`; candidates sort on this
    order: Vec<SegmentRank>,
}

/// Lookup tables over a validated route tree.
///
/// # Example
///
/// ```
/// use navigator_core::{Route, RouteTreeIndex, RouteTreeError};
///
/// let index = RouteTreeIndex::build(Route::root().children(vec![
///     Route::new("posts").child(Route::new(":postId")),
/// ]))
/// .unwrap();
/// assert_eq!(index.get("/posts/:postId").unwrap().parent_id(), Some("/posts"));
///
/// let err = RouteTreeIndex::build(Route::root().children(vec![
///     Route::new("posts"),
///     Route::new("/posts/"),
/// ]))
/// .unwrap_err();
/// assert_eq!(err, RouteTreeError::DuplicateRouteId("/posts".to_string()));
/// ```
pub struct RouteTreeIndex {
    nodes: Vec<RouteRef>,
    children: Vec<Vec<NodeId>>,
    by_id: HashMap<String, NodeId>,
    candidates: Vec<Vec<Candidate>>,
}

impl RouteTreeIndex {
    /// Validate and index a route tree rooted at `root`
    pub fn build(root: Route) -> Result<Self, RouteTreeError> {
        let mut builder = IndexBuilder::default();
        builder.insert(root, None)?;

        let mut index = RouteTreeIndex {
            nodes: builder.nodes.into_iter().map(Rc::new).collect(),
            children: builder.children,
            by_id: builder.by_id,
            candidates: Vec::new(),
        };
        index.candidates = (0..index.nodes.len())
            .map(|i| index.collect_candidates(NodeId(i)))
            .collect();

        debug_log!("indexed {} routes", index.nodes.len());
        Ok(index)
    }

    /// Look up a route by id
    pub fn get(&self, id: &str) -> Option<&RouteRef> {
        self.by_id.get(id).map(|node| &self.nodes[node.0])
    }

    /// The root route
    pub fn root(&self) -> &RouteRef {
        &self.nodes[0]
    }

    /// Number of indexed routes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index is empty (never true for a built index)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every route id in depth-first registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id())
    }

    /// The route and its ancestors, from the route up to the root
    pub fn ancestors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a RouteRef> + 'a {
        let mut next = self.get(id);
        std::iter::from_fn(move || {
            let node = next?;
            next = node.parent_id().and_then(|parent| self.get(parent));
            Some(node)
        })
    }

    /// Whether the route or any ancestor declares an error boundary
    pub fn has_error_boundary(&self, id: &str) -> bool {
        self.ancestors(id).any(|node| node.is_error_boundary())
    }

    pub(crate) fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub(crate) fn node(&self, node: NodeId) -> &RouteNode {
        &self.nodes[node.0]
    }

    pub(crate) fn candidates(&self, node: NodeId) -> &[Candidate] {
        &self.candidates[node.0]
    }

    fn collect_candidates(&self, node: NodeId) -> Vec<Candidate> {
        let mut out = Vec::new();
        self.expand(node, &mut Vec::new(), &mut out);
        // Stable: registration order survives between equal orders.
        out.sort_by(|a, b| a.order.cmp(&b.order));
        out
    }

    fn expand(&self, node: NodeId, via: &mut Vec<NodeId>, out: &mut Vec<Candidate>) {
        for &child in &self.children[node.0] {
            let child_node = self.node(child);
            if child_node.is_pathless() && !self.children[child.0].is_empty() {
                via.push(child);
                self.expand(child, via, out);
                via.pop();
                continue;
            }

            let mut order: Vec<SegmentRank> = child_node.segments.iter().map(Segment::rank).collect();
            order.push(SegmentRank::Index);
            out.push(Candidate {
                via: via.clone(),
                node: child,
                rank: order[0],
                order,
            });
        }
    }
}

impl fmt::Debug for RouteTreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTreeIndex")
            .field("routes", &self.nodes.iter().map(|n| n.id()).collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Default)]
struct IndexBuilder {
    nodes: Vec<RouteNode>,
    children: Vec<Vec<NodeId>>,
    by_id: HashMap<String, NodeId>,
}

impl IndexBuilder {
    fn insert(&mut self, route: Route, parent: Option<NodeId>) -> Result<NodeId, RouteTreeError> {
        let (parent_id, parent_full) = match parent {
            Some(p) => {
                let node = &self.nodes[p.0];
                (Some(node.id.clone()), node.full_path.clone())
            }
            None => (None, String::new()),
        };

        if let Some(path) = &route.path {
            validate_route_path(path)?;
        }

        let full_path = match &route.path {
            Some(path) => join_paths(&parent_full, path).into_owned(),
            None if parent_full.is_empty() => "/".to_string(),
            None => parent_full.clone(),
        };

        let id = match (&route.id, &route.path, &parent_id) {
            (Some(id), _, _) => id.clone(),
            (None, _, None) => ROOT_ROUTE_ID.to_string(),
            (None, Some(path), Some(_)) if path.trim_matches('/').is_empty() => {
                format!("{}/", parent_full.trim_end_matches('/'))
            }
            (None, Some(_), Some(_)) => full_path.clone(),
            (None, None, Some(parent)) => {
                return Err(RouteTreeError::MissingRouteId {
                    parent: parent.clone(),
                })
            }
        };

        let segments = match &route.path {
            Some(path) => Segment::parse_path(path).map_err(|reason| RouteTreeError::InvalidPath {
                path: path.clone(),
                reason,
            })?,
            None => Vec::new(),
        };

        let node_id = NodeId(self.nodes.len());
        if self.by_id.insert(id.clone(), node_id).is_some() {
            return Err(RouteTreeError::DuplicateRouteId(id));
        }

        let Route {
            path,
            children,
            loader,
            element,
            error_element,
            pending_element,
            options,
            ..
        } = route;

        self.nodes.push(RouteNode {
            id: id.clone(),
            path,
            full_path,
            parent_id,
            child_ids: Vec::new(),
            segments,
            loader,
            element,
            error_element,
            pending_element,
            options,
        });
        self.children.push(Vec::new());

        if let Some(p) = parent {
            self.children[p.0].push(node_id);
            self.nodes[p.0].child_ids.push(id);
        }

        for child in children {
            self.insert(child, Some(node_id))?;
        }

        Ok(node_id)
    }
}
