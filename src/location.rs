//! Locations and path arithmetic
//!
//! A [`Location`] is a URL decomposed into pathname, search and hash. The free
//! functions here join, resolve and interpolate path templates for route ids,
//! relative navigation and link hrefs.

use crate::params::{encode_uri_component, QueryParams, RouteParams};
use crate::route::split_segments;
use std::borrow::Cow;
use std::fmt;

/// A URL decomposed into its routing-relevant parts.
///
/// # Example
///
/// ```
/// use navigator_core::Location;
///
/// let location = Location::parse("/posts?page=2#comments");
/// assert_eq!(location.pathname, "/posts");
/// assert_eq!(location.search.get("page"), Some("2"));
/// assert_eq!(location.hash, "comments");
/// assert_eq!(location.href(), "/posts?page=2#comments");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Path component, always starting with `/`
    pub pathname: String,
    /// Parsed search string
    pub search: QueryParams,
    /// Fragment without the leading `#`
    pub hash: String,
}

impl Location {
    /// Create a location for a bare pathname
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: normalize_pathname(&pathname.into()),
            search: QueryParams::new(),
            hash: String::new(),
        }
    }

    /// Parse an href of the form `/path?search#hash`
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = href.split_once('#').unwrap_or((href, ""));
        let (pathname, search) = rest.split_once('?').unwrap_or((rest, ""));

        Self {
            pathname: normalize_pathname(pathname),
            search: QueryParams::parse(search),
            hash: hash.to_string(),
        }
    }

    /// Replace the search params
    pub fn with_search(mut self, search: QueryParams) -> Self {
        self.search = search;
        self
    }

    /// Replace the hash
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into().trim_start_matches('#').to_string();
        self
    }

    /// Search string including the leading `?`, or empty
    pub fn search_string(&self) -> String {
        if self.search.is_empty() {
            String::new()
        } else {
            format!("?{}", self.search.to_query_string())
        }
    }

    /// Render back to an href
    pub fn href(&self) -> String {
        let mut href = self.pathname.clone();
        href.push_str(&self.search_string());
        if !self.hash.is_empty() {
            href.push('#');
            href.push_str(&self.hash);
        }
        href
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

impl From<&str> for Location {
    fn from(href: &str) -> Self {
        Self::parse(href)
    }
}

impl From<String> for Location {
    fn from(href: String) -> Self {
        Self::parse(&href)
    }
}

fn normalize_pathname(pathname: &str) -> String {
    if pathname.starts_with('/') {
        pathname.to_string()
    } else {
        format!("/{}", pathname)
    }
}

/// Join a parent path and a child path template
///
/// Returns `Cow<str>` to avoid allocating when the child adds nothing.
///
/// # Example
///
/// ```
/// use navigator_core::join_paths;
///
/// assert_eq!(join_paths("/posts", ":postId"), "/posts/:postId");
/// assert_eq!(join_paths("/", "posts"), "/posts");
/// assert_eq!(join_paths("/posts", ""), "/posts");
/// ```
pub fn join_paths<'a>(parent: &'a str, child: &'a str) -> Cow<'a, str> {
    let trimmed_parent = parent.trim_end_matches('/');
    let child = child.trim_matches('/');

    if child.is_empty() {
        if trimmed_parent.is_empty() {
            Cow::Borrowed("/")
        } else if trimmed_parent == parent {
            Cow::Borrowed(parent)
        } else {
            Cow::Owned(trimmed_parent.to_string())
        }
    } else {
        Cow::Owned(format!("{}/{}", trimmed_parent, child))
    }
}

/// Resolve `to` against `base`
///
/// Absolute targets replace the base; `.` keeps the current level and `..`
/// climbs one. A trailing slash on `to` is preserved so index-route ids
/// (`/posts/`) stay addressable.
///
/// # Example
///
/// ```
/// use navigator_core::resolve_path;
///
/// assert_eq!(resolve_path("/posts/:postId", ".."), "/posts");
/// assert_eq!(resolve_path("/posts", "./new"), "/posts/new");
/// assert_eq!(resolve_path("/posts", "/about"), "/about");
/// ```
pub fn resolve_path(base: &str, to: &str) -> String {
    let mut segments: Vec<&str> = if to.starts_with('/') {
        Vec::new()
    } else {
        split_segments(base).collect()
    };

    for segment in split_segments(to) {
        match segment {
            "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut resolved = format!("/{}", segments.join("/"));
    if to.ends_with('/') && resolved != "/" {
        resolved.push('/');
    }
    resolved
}

/// Fill `:param` and `*` placeholders from `params`
///
/// Values are percent-encoded; placeholders without a value are left as-is.
pub fn interpolate_path(template: &str, params: &RouteParams) -> String {
    let filled: Vec<Cow<'_, str>> = template
        .split('/')
        .map(|segment| {
            let name = if segment == "*" {
                Some("*")
            } else {
                segment
                    .strip_prefix(':')
                    .map(|rest| rest.split('<').next().unwrap_or(rest))
            };
            match name.and_then(|name| params.get(name)) {
                Some(value) if name == Some("*") => Cow::Owned(value.to_string()),
                Some(value) => Cow::Owned(encode_uri_component(value)),
                None => Cow::Borrowed(segment),
            }
        })
        .collect();

    filled.join("/")
}

/// Whether `to` is an absolute URL that leaves the router's domain
pub fn is_external(to: &str) -> bool {
    !to.starts_with('/') && !to.starts_with('.') && url::Url::parse(to).is_ok()
}
