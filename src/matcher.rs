//! Path matching
//!
//! Resolves a pathname against a [`RouteTreeIndex`] into the deepest
//! root-to-leaf chain of routes that consumes the whole path.
//!
//! At every level children are tried in a fixed order:
//!
//! 1. static segment
//! 2. dynamic `:param` segment (constrained or not)
//! 3. wildcard `*` segment
//!
//! compared segment by segment, with registration order breaking ties. A
//! route whose path ends earlier yields to one with more segments. The search
//! backtracks, so a static child that dead-ends further down yields to a
//! dynamic sibling. Pathless layout routes are transparent: their children
//! compete at the layout's parent level.

use crate::params::{decode_uri_component, RouteParams};
use crate::route::split_segments;
use crate::tree::{NodeId, RouteTreeIndex};
use crate::trace_log;

/// Match precedence of a candidate child, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentRank {
    /// Leading segment is literal text
    Static,
    /// Leading segment captures one value
    Dynamic,
    /// Leading segment captures the rest of the path
    Wildcard,
    /// Consumes nothing (index routes, childless layouts)
    Index,
}

/// A single segment in a route path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Static text that must match
    Static(String),
    /// Parameter that captures one segment
    Param {
        name: String,
        constraint: Option<Constraint>,
    },
    /// Captures every remaining segment under the `*` param
    Wildcard,
}

impl Segment {
    /// Parse a segment from a path template
    ///
    /// - `posts` -> `Static("posts")`
    /// - `:id` -> `Param { name: "id", constraint: None }`
    /// - `:id<\d+>` -> `Param { name: "id", constraint: Some(Numeric) }`
    /// - `*` -> `Wildcard`
    pub fn parse(s: &str) -> Result<Self, String> {
        if s == "*" {
            return Ok(Segment::Wildcard);
        }

        let Some(rest) = s.strip_prefix(':') else {
            return Ok(Segment::Static(s.to_string()));
        };

        match rest.find('<') {
            Some(pos) => {
                let body = rest[pos + 1..].trim_end_matches('>');
                Ok(Segment::Param {
                    name: rest[..pos].to_string(),
                    constraint: Some(Constraint::parse(body)?),
                })
            }
            None => Ok(Segment::Param {
                name: rest.to_string(),
                constraint: None,
            }),
        }
    }

    /// Parse every segment of a path template
    pub fn parse_path(path: &str) -> Result<Vec<Self>, String> {
        split_segments(path).map(Self::parse).collect()
    }

    /// Precedence class of this segment
    pub fn rank(&self) -> SegmentRank {
        match self {
            Segment::Static(_) => SegmentRank::Static,
            Segment::Param { .. } => SegmentRank::Dynamic,
            Segment::Wildcard => SegmentRank::Wildcard,
        }
    }
}

/// Constraint for validating parameter values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// ASCII digits only
    Numeric,
    /// 8-4-4-4-12 hex groups
    Uuid,
}

impl Constraint {
    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "\\d+" | "int" => Ok(Constraint::Numeric),
            "uuid" => Ok(Constraint::Uuid),
            other => Err(format!("unknown constraint '{}'", other)),
        }
    }

    /// Validate a value against this constraint
    pub fn validate(&self, value: &str) -> bool {
        match self {
            Constraint::Numeric => !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()),
            Constraint::Uuid => {
                let parts: Vec<&str> = value.split('-').collect();
                let lengths = [8, 4, 4, 4, 12];
                parts.len() == lengths.len()
                    && parts
                        .iter()
                        .zip(lengths)
                        .all(|(p, len)| p.len() == len && p.chars().all(|c| c.is_ascii_hexdigit()))
            }
        }
    }
}

/// Match a route's own segments against the head of `path`
///
/// Returns how many path segments were consumed and the params captured by
/// this route alone.
pub(crate) fn match_segments(
    segments: &[Segment],
    path: &[&str],
    case_sensitive: bool,
) -> Option<(usize, RouteParams)> {
    let mut params = RouteParams::new();

    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Static(expected) => {
                let actual = path.get(i)?;
                let equal = if case_sensitive {
                    actual == expected
                } else {
                    actual.to_lowercase() == expected.to_lowercase()
                };
                if !equal {
                    return None;
                }
            }
            Segment::Param { name, constraint } => {
                let value = decode_uri_component(path.get(i)?);
                if let Some(constraint) = constraint {
                    if !constraint.validate(&value) {
                        return None;
                    }
                }
                params.insert(name.clone(), value);
            }
            Segment::Wildcard => {
                let rest: Vec<String> = path[i.min(path.len())..]
                    .iter()
                    .map(|s| decode_uri_component(s))
                    .collect();
                params.insert("*", rest.join("/"));
                return Some((path.len(), params));
            }
        }
    }

    Some((segments.len(), params))
}

/// One resolved level of a match chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// Id of the matched route
    pub route_id: String,
    /// URL portion matched from the root down to this route
    pub pathname: String,
    /// Params captured by this route's own segments
    pub params: RouteParams,
}

/// Root-to-leaf sequence of resolved routes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchChain {
    entries: Vec<ChainEntry>,
}

impl MatchChain {
    /// Entries from root to leaf
    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    /// Route ids from root to leaf
    pub fn route_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.route_id.as_str()).collect()
    }

    /// Deepest entry
    pub fn leaf(&self) -> Option<&ChainEntry> {
        self.entries.last()
    }

    /// Params of every level merged, deeper levels winning
    pub fn all_params(&self) -> RouteParams {
        let mut params = RouteParams::new();
        for entry in &self.entries {
            params.extend(&entry.params);
        }
        params
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Matching switches owned by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Case sensitivity for routes that don't set their own
    pub case_sensitive: bool,
}

/// Resolve `pathname` with default options (case-insensitive)
///
/// `None` means no chain consumes the whole path; callers treat it as
/// "render nothing", not as an error.
pub fn match_path(index: &RouteTreeIndex, pathname: &str) -> Option<MatchChain> {
    match_path_with(index, pathname, MatchOptions::default())
}

/// Resolve `pathname` against the index
pub fn match_path_with(
    index: &RouteTreeIndex,
    pathname: &str,
    options: MatchOptions,
) -> Option<MatchChain> {
    let path: Vec<&str> = split_segments(pathname).collect();
    let root = index.root_id();
    let root_node = index.node(root);

    let (consumed, params) = match_segments(
        &root_node.segments,
        &path,
        root_node.case_sensitive(options.case_sensitive),
    )?;

    let mut matcher = ChainBuilder {
        index,
        path: &path,
        options,
        entries: Vec::with_capacity(path.len() + 1),
    };
    matcher.push(root, consumed, params);

    if matcher.descend(root, consumed) {
        trace_log!(
            "matched '{}' -> {:?}",
            pathname,
            matcher.entries.iter().map(|e| &e.route_id).collect::<Vec<_>>()
        );
        Some(MatchChain {
            entries: matcher.entries,
        })
    } else {
        trace_log!("no route chain matches '{}'", pathname);
        None
    }
}

struct ChainBuilder<'a> {
    index: &'a RouteTreeIndex,
    path: &'a [&'a str],
    options: MatchOptions,
    entries: Vec<ChainEntry>,
}

impl ChainBuilder<'_> {
    fn pathname(&self, consumed: usize) -> String {
        format!("/{}", self.path[..consumed].join("/"))
    }

    fn push(&mut self, node: NodeId, consumed: usize, params: RouteParams) {
        self.entries.push(ChainEntry {
            route_id: self.index.node(node).id().to_string(),
            pathname: self.pathname(consumed),
            params,
        });
    }

    /// Depth-first search below `node`, with `consumed` path segments used
    fn descend(&mut self, node: NodeId, consumed: usize) -> bool {
        let remaining = &self.path[consumed..];
        let index = self.index;

        if remaining.is_empty() {
            // Prefer a deeper zero-width chain (index route, wildcard child);
            // otherwise this node terminates the chain.
            for rank in [SegmentRank::Index, SegmentRank::Wildcard] {
                for candidate in index.candidates(node).iter().filter(|c| c.rank == rank) {
                    if self.try_candidate(candidate.via.as_slice(), candidate.node, consumed) {
                        return true;
                    }
                }
            }
            return true;
        }

        for candidate in index.candidates(node) {
            if candidate.rank == SegmentRank::Index
                && index.node(candidate.node).child_ids().is_empty()
            {
                continue;
            }
            if self.try_candidate(candidate.via.as_slice(), candidate.node, consumed) {
                return true;
            }
        }

        false
    }

    fn try_candidate(&mut self, via: &[NodeId], node: NodeId, consumed: usize) -> bool {
        let child = self.index.node(node);
        let Some((used, params)) = match_segments(
            &child.segments,
            &self.path[consumed..],
            child.case_sensitive(self.options.case_sensitive),
        ) else {
            return false;
        };

        let mark = self.entries.len();
        for layout in via {
            self.push(*layout, consumed, RouteParams::new());
        }
        self.push(node, consumed + used, params);

        if self.descend(node, consumed + used) {
            return true;
        }

        self.entries.truncate(mark);
        false
    }
}
