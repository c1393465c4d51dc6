//! Link projection
//!
//! [`Router::build_link`](crate::Router::build_link) turns [`LinkOptions`]
//! into a [`Link`]: the href to render, whether the target is active against
//! the current state, and handlers a binding layer wires to click and hover.

use crate::error::NavigationError;
use crate::params::{QueryParams, RouteParams};
use crate::router::{NavigateOptions, Router};
use crate::{NavigationResult, RouteMatch};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::fmt;

/// How a link's active state is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveOptions {
    /// Only the exact target chain counts; descendants don't
    pub exact: bool,
    /// The current hash must equal the target hash
    pub include_hash: bool,
}

/// Input to [`Router::build_link`]
#[derive(Debug, Clone, Default)]
pub struct LinkOptions {
    pub to: String,
    /// Route id the target is relative to
    pub from: Option<String>,
    pub params: RouteParams,
    pub search: Option<QueryParams>,
    pub hash: Option<String>,
    pub replace: bool,
    pub disabled: bool,
    /// Preload the target when the pointer enters the link
    pub preload: bool,
    pub active_options: ActiveOptions,
}

impl LinkOptions {
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

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.active_options.exact = exact;
        self
    }

    pub fn include_hash(mut self, include_hash: bool) -> Self {
        self.active_options.include_hash = include_hash;
        self
    }

    pub(crate) fn navigate_options(&self) -> NavigateOptions {
        NavigateOptions {
            to: self.to.clone(),
            from: self.from.clone(),
            params: self.params.clone(),
            search: self.search.clone(),
            hash: self.hash.clone(),
            replace: self.replace,
        }
    }
}

impl From<&str> for LinkOptions {
    fn from(to: &str) -> Self {
        Self::new(to)
    }
}

/// Whether a link stays inside the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Internal,
    /// Absolute URL; rendered as a plain anchor
    External,
}

/// Result of [`Router::build_link`]
#[derive(Clone)]
pub struct Link {
    pub kind: LinkKind,
    pub href: String,
    pub is_active: bool,
    pub disabled: bool,
    /// Navigation performed on click; `None` for external links
    pub next: Option<NavigateOptions>,
    preload: bool,
    router: Router,
}

impl Link {
    pub(crate) fn new(
        kind: LinkKind,
        href: String,
        is_active: bool,
        options: &LinkOptions,
        router: Router,
    ) -> Self {
        let next = (kind == LinkKind::Internal).then(|| options.navigate_options());
        Self {
            kind,
            href,
            is_active,
            disabled: options.disabled,
            next,
            preload: options.preload,
            router,
        }
    }

    /// Navigation to run on click
    ///
    /// `None` when the link is external or disabled; the binding layer then
    /// leaves the event to the platform.
    pub fn handle_click(
        &self,
    ) -> Option<LocalBoxFuture<'static, Result<NavigationResult, NavigationError>>> {
        if self.disabled {
            return None;
        }
        let next = self.next.clone()?;
        let router = self.router.clone();
        Some(async move { router.navigate(next).await }.boxed_local())
    }

    /// Preload to run when the pointer enters the link
    ///
    /// `None` unless the link is internal, enabled and has preloading on.
    pub fn handle_enter(&self) -> Option<LocalBoxFuture<'static, Vec<RouteMatch>>> {
        if self.disabled || !self.preload {
            return None;
        }
        let next = self.next.clone()?;
        let router = self.router.clone();
        Some(async move { router.preload(next).await }.boxed_local())
    }

    pub fn is_external(&self) -> bool {
        self.kind == LinkKind::External
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("kind", &self.kind)
            .field("href", &self.href)
            .field("is_active", &self.is_active)
            .field("disabled", &self.disabled)
            .field("preload", &self.preload)
            .finish_non_exhaustive()
    }
}
