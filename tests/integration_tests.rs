//! Integration tests for navigator_core
//!
//! These tests verify the complete router workflow: tree construction,
//! matching, transitions, loaders, error boundaries, preloading and links.

use navigator_core::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ids(matches: &[RouteMatch]) -> Vec<&str> {
    matches.iter().map(|m| m.route_id.as_str()).collect()
}

fn posts_router() -> Router {
    Router::new(
        Route::root().children(vec![
            Route::new("/").element("Home"),
            Route::new("posts")
                .element("Posts")
                .children(vec![Route::new(":postId").element("Post")]),
        ]),
        RouterOptions::default(),
    )
    .expect("valid tree")
}

/// Loader that sleeps `ms` and returns `value`, counting its calls
fn slow_route(path: &str, ms: u64, value: &'static str, calls: Rc<Cell<u32>>) -> Route {
    Route::new(path).loader(move |_ctx| {
        calls.set(calls.get() + 1);
        async move {
            sleep(Duration::from_millis(ms)).await;
            Ok::<_, LoaderError>(value)
        }
    })
}

// ============================================================================
// Route Tree Tests
// ============================================================================

#[test]
fn test_duplicate_route_id_fails_build() {
    let err = RouteTreeIndex::build(Route::root().children(vec![
        Route::new("posts"),
        Route::new("about").id("/posts"),
    ]))
    .unwrap_err();
    assert_eq!(err, RouteTreeError::DuplicateRouteId("/posts".to_string()));

    assert!(RouteTreeIndex::build(Route::root().children(vec![
        Route::new("posts"),
        Route::new("about"),
    ]))
    .is_ok());
}

#[test]
fn test_route_lookup_and_parent_links() {
    let router = posts_router();
    let post = router.get_route("/posts/:postId").unwrap();
    assert_eq!(post.parent_id(), Some("/posts"));
    assert_eq!(post.path(), Some(":postId"));
    assert!(post.element().is_some());

    let root = router.get_route(ROOT_ROUTE_ID).unwrap();
    assert_eq!(root.child_ids(), ["/", "/posts"]);
}

// ============================================================================
// Matching Tests
// ============================================================================

#[test]
fn test_posts_chain_and_no_match() {
    let index = RouteTreeIndex::build(Route::root().children(vec![
        Route::new("/"),
        Route::new("posts").child(Route::new(":postId")),
    ]))
    .unwrap();

    let chain = match_path(&index, "/posts/5").unwrap();
    assert_eq!(chain.route_ids(), [ROOT_ROUTE_ID, "/posts", "/posts/:postId"]);
    assert_eq!(chain.all_params(), RouteParams::new().with("postId", "5"));

    assert!(match_path(&index, "/unknown").is_none());
}

#[test]
fn test_match_precedence_is_deterministic() {
    let index = RouteTreeIndex::build(Route::root().children(vec![
        Route::new("files/*"),
        Route::new("files/:name"),
        Route::new("files/readme"),
    ]))
    .unwrap();

    for _ in 0..3 {
        assert_eq!(
            match_path(&index, "/files/readme").unwrap().leaf().unwrap().route_id,
            "/files/readme"
        );
        assert_eq!(
            match_path(&index, "/files/notes").unwrap().leaf().unwrap().route_id,
            "/files/:name"
        );
        assert_eq!(
            match_path(&index, "/files/a/b").unwrap().leaf().unwrap().route_id,
            "/files/*"
        );
    }
}

// ============================================================================
// Navigation Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_navigate_to_post() {
    init_logging();
    let router = posts_router();

    let result = router.navigate("/posts/5").await.unwrap();
    assert!(result.is_committed());

    let state = router.state();
    assert_eq!(ids(&state.matches), [ROOT_ROUTE_ID, "/posts", "/posts/:postId"]);
    assert_eq!(state.leaf().unwrap().params.get("postId"), Some("5"));
    assert_eq!(state.status, RouterStatus::Idle);
    assert!(state.pending_location.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_state_is_replaced_wholesale() {
    let router = posts_router();
    let before = router.state();

    router.navigate("/posts").await.unwrap();
    let after = router.state();

    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(before.location.pathname, "/");
    assert_eq!(after.location.pathname, "/posts");
}

#[tokio::test(start_paused = true)]
async fn test_superseded_navigation_never_commits() {
    init_logging();
    let a_calls = Rc::new(Cell::new(0));
    let b_calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().children(vec![
            slow_route("a", 100, "a", a_calls.clone()),
            slow_route("b", 10, "b", b_calls.clone()),
        ]),
        RouterOptions::default(),
    )
    .unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = router.subscribe(move |state| {
        sink.borrow_mut()
            .push((state.location.pathname.clone(), ids(&state.matches).join(",")));
    });

    let (a, b) = tokio::join!(router.navigate("/a"), router.navigate("/b"));

    assert!(a.unwrap().is_superseded());
    assert!(b.unwrap().is_committed());
    assert_eq!(a_calls.get(), 1);
    assert_eq!(b_calls.get(), 1);

    // The superseded loader resolves well after /b committed
    sleep(Duration::from_millis(200)).await;

    assert_eq!(
        *seen.borrow(),
        [("/b".to_string(), format!("{},/b", ROOT_ROUTE_ID))]
    );
    assert_eq!(router.state().location.pathname, "/b");
    assert_eq!(router.history().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_superseded_failing_loader_produces_no_error() {
    init_logging();
    let b_calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().children(vec![
            Route::new("a").loader(|_ctx| async {
                sleep(Duration::from_millis(100)).await;
                Err::<(), _>(LoaderError::new("a failed"))
            }),
            slow_route("b", 10, "b", b_calls),
        ]),
        RouterOptions::default(),
    )
    .unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = router.subscribe(move |state| {
        sink.borrow_mut().push(state.location.pathname.clone());
    });

    let (a, b) = tokio::join!(router.navigate("/a"), router.navigate("/b"));

    assert!(a.expect("superseded navigation is not an error").is_superseded());
    let committed = b.unwrap().state().cloned().unwrap();

    let state = router.state();
    assert!(Rc::ptr_eq(&state, &committed));
    assert_eq!(state.location.pathname, "/b");
    assert!(!state.is_transitioning());
    assert_eq!(ids(&state.matches), [ROOT_ROUTE_ID, "/b"]);
    assert_eq!(*seen.borrow(), ["/b"]);
}

#[tokio::test(start_paused = true)]
async fn test_state_transitioning_while_loading() {
    let calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().child(slow_route("slow", 100, "done", calls)),
        RouterOptions::default(),
    )
    .unwrap();

    let observe = async {
        sleep(Duration::from_millis(10)).await;
        let state = router.state();
        assert!(state.is_transitioning());
        assert_eq!(state.location.pathname, "/");
        assert_eq!(state.pending_location.as_ref().unwrap().pathname, "/slow");

        let pending = router.pending_matches().unwrap();
        assert_eq!(pending[1].status(), MatchStatus::Loading);
    };

    let (result, ()) = tokio::join!(router.navigate("/slow"), observe);
    assert!(result.unwrap().is_committed());
    assert!(router.pending_matches().is_none());
    assert_eq!(
        router.state().leaf().unwrap().data_as::<&str>(),
        Some(&"done")
    );
}

// ============================================================================
// Loader Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_unhandled_loader_error_reverts_state() {
    init_logging();
    let router = Router::new(
        Route::root().children(vec![
            Route::new("home"),
            Route::new("broken").child(
                Route::new(":id").loader(|ctx| async move {
                    Err::<(), _>(LoaderError::new(format!("no item {}", ctx.params.get("id").unwrap_or(""))))
                }),
            ),
        ]),
        RouterOptions::default(),
    )
    .unwrap();
    router.navigate("/home").await.unwrap();
    let before = router.state();

    let notified = Rc::new(Cell::new(0));
    let counter = notified.clone();
    let _subscription = router.subscribe(move |_| counter.set(counter.get() + 1));

    let err = router.navigate("/broken/7").await.unwrap_err();
    match &err {
        NavigationError::UnhandledLoaderError { route_id, error } => {
            assert_eq!(route_id, "/broken/:id");
            assert_eq!(error.message(), "no item 7");
        }
    }

    assert!(Rc::ptr_eq(&before, &router.state()));
    assert_eq!(notified.get(), 0);
    assert_eq!(router.history().current().pathname, "/home");
}

#[tokio::test(start_paused = true)]
async fn test_ancestor_boundary_contains_error() {
    let router = Router::new(
        Route::root().child(
            Route::new("dashboard")
                .use_error_boundary(true)
                .loader(|_| async { Ok::<_, LoaderError>("layout") })
                .child(
                    Route::new("stats")
                        .loader(|_| async { Err::<(), _>(LoaderError::new("stats down")) }),
                ),
        ),
        RouterOptions::default(),
    )
    .unwrap();

    let result = router.navigate("/dashboard/stats").await.unwrap();
    assert!(result.is_committed());

    let state = router.state();
    let layout = state.get_match("/dashboard").unwrap();
    let stats = state.get_match("/dashboard/stats").unwrap();
    assert_eq!(layout.status(), MatchStatus::Ready);
    assert_eq!(stats.status(), MatchStatus::Error);
    assert!(stats.data().is_none());
    assert_eq!(stats.error().unwrap().message(), "stats down");
    assert!(matches!(router.surface(stats), Surface::Propagate(_)));
}

#[tokio::test(start_paused = true)]
async fn test_loaders_run_concurrently_across_levels() {
    let calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().child(
            slow_route("outer", 100, "outer", calls.clone())
                .child(slow_route("inner", 100, "inner", calls.clone())),
        ),
        RouterOptions::default(),
    )
    .unwrap();

    let start = Instant::now();
    router.navigate("/outer/inner").await.unwrap();

    assert!(start.elapsed() < Duration::from_millis(150));
    assert_eq!(calls.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_loader_receives_context() {
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    let router = Router::new(
        Route::root().child(Route::new("users").child(Route::new(":id").loader(move |ctx| {
            *sink.borrow_mut() = Some(ctx);
            async { Ok::<_, LoaderError>(()) }
        }))),
        RouterOptions::default(),
    )
    .unwrap();

    router.navigate("/users/42?tab=posts").await.unwrap();

    let ctx = seen.borrow().clone().unwrap();
    assert_eq!(ctx.route_id, "/users/:id");
    assert_eq!(ctx.pathname, "/users/42");
    assert_eq!(ctx.params.get_as::<u32>("id"), Some(42));
    assert_eq!(ctx.location.search.get("tab"), Some("posts"));
    assert!(!ctx.preload);
}

#[tokio::test(start_paused = true)]
async fn test_is_pending_only_after_pending_ms() {
    let calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().child(
            slow_route("report", 500, "report", calls)
                .pending_ms(Duration::from_millis(200))
                .pending_element("Spinner"),
        ),
        RouterOptions::default(),
    )
    .unwrap();

    let observe = async {
        sleep(Duration::from_millis(150)).await;
        let early = router.pending_matches().unwrap();
        assert!(!early[1].is_pending());
        assert!(router.surface(&early[1]).is_nothing());

        sleep(Duration::from_millis(100)).await;
        let late = router.pending_matches().unwrap();
        assert!(late[1].is_pending());
        assert!(matches!(router.surface(&late[1]), Surface::Pending(_)));
    };

    let (result, ()) = tokio::join!(router.navigate("/report"), observe);
    result.unwrap();

    let settled = router.state();
    let report = settled.leaf().unwrap();
    assert!(!report.is_pending());
    assert_eq!(report.status(), MatchStatus::Ready);
    assert!(matches!(router.surface(report), Surface::Element(_) | Surface::Nothing));
}

#[tokio::test(start_paused = true)]
async fn test_fast_loader_never_pending() {
    let calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().child(slow_route("quick", 50, "quick", calls)),
        RouterOptions::default().default_pending_ms(Duration::from_millis(100)),
    )
    .unwrap();

    let observe = async {
        for _ in 0..4 {
            sleep(Duration::from_millis(20)).await;
            if let Some(matches) = router.pending_matches() {
                assert!(matches.iter().all(|m| !m.is_pending()));
            }
        }
    };

    let (result, ()) = tokio::join!(router.navigate("/quick"), observe);
    result.unwrap();
    assert!(router.state().matches.iter().all(|m| !m.is_pending()));
}

// ============================================================================
// Preload Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_preload_is_consumed_by_navigation() {
    let calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().child(slow_route("feed", 30, "feed", calls.clone())),
        RouterOptions::default(),
    )
    .unwrap();

    let preloaded = router.preload("/feed").await;
    assert_eq!(preloaded[1].data_as::<&str>(), Some(&"feed"));
    assert_eq!(calls.get(), 1);
    assert_eq!(router.state().location.pathname, "/");

    router.navigate("/feed").await.unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(router.state().leaf().unwrap().data_as::<&str>(), Some(&"feed"));

    // Consumed: the next visit loads again
    router.navigate("/").await.unwrap();
    router.navigate("/feed").await.unwrap();
    assert_eq!(calls.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stale_preload_is_ignored() {
    let calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().child(
            slow_route("feed", 1, "feed", calls.clone()).preload_max_age(Duration::from_secs(1)),
        ),
        RouterOptions::default(),
    )
    .unwrap();

    router.preload("/feed").await;
    sleep(Duration::from_secs(2)).await;
    router.navigate("/feed").await.unwrap();
    assert_eq!(calls.get(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_link_enter_preloads() {
    let calls = Rc::new(Cell::new(0));
    let router = Router::new(
        Route::root().child(slow_route("feed", 5, "feed", calls.clone())),
        RouterOptions::default(),
    )
    .unwrap();

    let link = router.build_link(LinkOptions::new("/feed").preload(true));
    link.handle_enter().unwrap().await;
    assert_eq!(calls.get(), 1);

    link.handle_click().unwrap().await.unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(router.state().location.pathname, "/feed");

    let plain = router.build_link("/feed");
    assert!(plain.handle_enter().is_none());
}

// ============================================================================
// Link Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_link_active_state_follows_navigation() {
    let router = posts_router();
    router.load().await.unwrap();

    assert!(router.build_link("/").is_active);
    assert!(!router.build_link("/posts").is_active);

    router.navigate("/posts/5").await.unwrap();
    assert!(router.build_link("/posts").is_active);
    assert!(!router.build_link(LinkOptions::new("/posts").exact(true)).is_active);
    assert!(router.build_link(LinkOptions::new("/posts/5").exact(true)).is_active);
    assert!(!router.build_link("/posts/6").is_active);
    assert!(!router.build_link("/nowhere").is_active);
}

#[tokio::test(start_paused = true)]
async fn test_relative_link_from_route() {
    let router = posts_router();
    router.navigate("/posts/5").await.unwrap();

    let up = router.build_link(LinkOptions::new("..").from_route("/posts/:postId"));
    assert_eq!(up.href, "/posts");

    let sibling = router.build_link(LinkOptions::new("./:postId").from_route("/posts").param("postId", "8"));
    assert_eq!(sibling.href, "/posts/8");

    let searched = router.build_link(
        LinkOptions::new("/posts")
            .search(QueryParams::new().with("page", "2"))
            .hash("top"),
    );
    assert_eq!(searched.href, "/posts?page=2#top");
}

// ============================================================================
// Blocking and History Tests
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_blocked_navigation_keeps_state() {
    let router = posts_router();
    router.navigate("/posts").await.unwrap();
    let before = router.state();

    let notified = Rc::new(Cell::new(0));
    let counter = notified.clone();
    let _subscription = router.subscribe(move |_| counter.set(counter.get() + 1));
    let _blocker = router.block(|from, to| from.pathname == "/posts" && to.pathname == "/");

    let result = router.navigate("/").await.unwrap();
    assert!(matches!(result, NavigationResult::Blocked { ref to } if to == "/"));
    assert!(Rc::ptr_eq(&before, &router.state()));
    assert_eq!(notified.get(), 0);

    // Back is subject to the same blocker
    assert!(router.back().await.unwrap().unwrap().is_blocked());
}

#[tokio::test(start_paused = true)]
async fn test_back_and_forward_reload_matches() {
    let router = posts_router();
    router.navigate("/posts/1").await.unwrap();
    router.navigate("/posts/2").await.unwrap();

    router.back().await.unwrap().unwrap();
    assert_eq!(router.state().leaf().unwrap().params.get("postId"), Some("1"));

    router.forward().await.unwrap().unwrap();
    assert_eq!(router.state().leaf().unwrap().params.get("postId"), Some("2"));
}

#[tokio::test(start_paused = true)]
async fn test_load_resolves_initial_location() {
    let router = Router::new(
        Route::root().child(Route::new("posts").child(Route::new(":postId"))),
        RouterOptions::default().initial_location("/posts/3"),
    )
    .unwrap();
    assert!(router.state().matches.is_empty());

    router.load().await.unwrap();
    assert_eq!(router.state().leaf().unwrap().route_id, "/posts/:postId");
    assert_eq!(router.history().len(), 1);
}

// ============================================================================
// Case Sensitivity
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_router_case_sensitivity() {
    let tree = || Route::root().child(Route::new("About"));

    let relaxed = Router::new(tree(), RouterOptions::default()).unwrap();
    assert!(relaxed.navigate("/about").await.unwrap().is_committed());

    let strict = Router::new(tree(), RouterOptions::default().case_sensitive(true)).unwrap();
    assert!(strict.navigate("/about").await.unwrap().is_not_found());
    assert!(strict.navigate("/About").await.unwrap().is_committed());
}
