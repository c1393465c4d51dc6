//! Loader orchestration
//!
//! Runs the loaders of one match chain concurrently. Every match moves
//! through `idle -> loading -> ready | error` on its own; a slow loader never
//! holds back a sibling. A per-route pending delay flips `is_pending` on a
//! match whose loader is still running once the delay elapses. The delay is
//! timed with `tokio::time` and skipped when no tokio runtime is running, in
//! which case matches never turn pending. Results that arrive after the batch
//! was cancelled are dropped.

use crate::route::{LoaderContext, LoaderData, LoaderFn};
use crate::transition::LoadBatch;
use crate::{trace_log, warn_log, RouteMatch};
use futures::future::{self, Either};
use std::time::Duration;

/// Work for one match of a batch
pub(crate) struct LoadJob {
    /// Position of the match in the batch
    pub index: usize,
    pub loader: Option<LoaderFn>,
    pub context: LoaderContext,
    /// Delay before the match counts as pending; `None` disables the timer
    pub pending_after: Option<Duration>,
    /// Fresh preloaded data that replaces the loader call
    pub preloaded: Option<LoaderData>,
}

/// Drive every job of `batch` to completion
///
/// Returns once each loader has settled, whether or not the batch was
/// cancelled in the meantime.
pub(crate) async fn load_matches(batch: &LoadBatch, jobs: Vec<LoadJob>) {
    future::join_all(jobs.into_iter().map(|job| run_job(batch, job))).await;
}

async fn run_job(batch: &LoadBatch, job: LoadJob) {
    let LoadJob {
        index,
        loader,
        context,
        pending_after,
        preloaded,
    } = job;

    if let Some(data) = preloaded {
        trace_log!("using preloaded data for '{}'", context.route_id);
        batch.update(index, |m| m.set_ready(Some(data)));
        return;
    }

    let Some(loader) = loader else {
        batch.update(index, |m| m.set_ready(None));
        return;
    };

    let route_id = context.route_id.clone();
    batch.update(index, RouteMatch::set_loading);
    let pending = loader(context);

    let pending_after = pending_after.filter(|_| {
        let timer = tokio::runtime::Handle::try_current().is_ok();
        if !timer {
            trace_log!("no tokio runtime, '{}' will not turn pending", route_id);
        }
        timer
    });

    let result = match pending_after {
        Some(delay) => match future::select(pending, Box::pin(tokio::time::sleep(delay))).await {
            Either::Left((result, _timer)) => result,
            Either::Right(((), pending)) => {
                trace_log!("loader for '{}' is pending after {:?}", route_id, delay);
                batch.update(index, |m| m.set_pending(true));
                pending.await
            }
        },
        None => pending.await,
    };

    if batch.is_cancelled() {
        trace_log!("dropping result of '{}' from a cancelled batch", route_id);
        return;
    }

    match result {
        Ok(data) => batch.update(index, |m| m.set_ready(Some(data))),
        Err(error) => {
            warn_log!("loader for route '{}' failed: {}", route_id, error);
            batch.update(index, |m| m.set_error(error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;
    use crate::location::Location;
    use crate::params::RouteParams;
    use crate::route::Route;
    use crate::transition::CancelFlag;
    use crate::MatchStatus;
    use std::cell::Cell;
    use std::rc::Rc;

    fn context(route_id: &str) -> LoaderContext {
        LoaderContext {
            route_id: route_id.to_string(),
            pathname: route_id.to_string(),
            params: RouteParams::new(),
            location: Location::new(route_id),
            preload: false,
        }
    }

    fn batch(ids: &[&str]) -> LoadBatch {
        let matches = ids
            .iter()
            .map(|id| RouteMatch::new(*id, *id, RouteParams::new()))
            .collect();
        LoadBatch::new(matches, CancelFlag::new())
    }

    fn loader_of(route: Route) -> Option<LoaderFn> {
        route.loader
    }

    fn job(index: usize, route_id: &str, loader: Option<LoaderFn>) -> LoadJob {
        LoadJob {
            index,
            loader,
            context: context(route_id),
            pending_after: None,
            preloaded: None,
        }
    }

    fn delayed(ms: u64, value: &'static str) -> Option<LoaderFn> {
        loader_of(Route::new("x").loader(move |_| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok::<_, LoaderError>(value)
        }))
    }

    #[test]
    fn test_route_without_loader_is_ready() {
        let batch = batch(&["/about"]);
        pollster::block_on(load_matches(&batch, vec![job(0, "/about", None)]));

        let matches = batch.snapshot();
        assert_eq!(matches[0].status(), MatchStatus::Ready);
        assert!(matches[0].data().is_none());
    }

    #[test]
    fn test_loader_error_is_attached() {
        let batch = batch(&["/posts"]);
        let loader = loader_of(
            Route::new("posts").loader(|_| async { Err::<(), _>(LoaderError::new("boom")) }),
        );
        pollster::block_on(load_matches(&batch, vec![job(0, "/posts", loader)]));

        let matches = batch.snapshot();
        assert_eq!(matches[0].status(), MatchStatus::Error);
        assert_eq!(matches[0].error().unwrap().message(), "boom");
        assert!(matches[0].data().is_none());
    }

    #[test]
    fn test_preloaded_data_skips_loader() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let loader = loader_of(Route::new("posts").loader(move |_| {
            counter.set(counter.get() + 1);
            async { Ok::<_, LoaderError>("fresh") }
        }));
        let batch = batch(&["/posts"]);
        let mut job = job(0, "/posts", loader);
        job.preloaded = Some(Rc::new("cached"));

        pollster::block_on(load_matches(&batch, vec![job]));
        assert_eq!(calls.get(), 0);
        assert_eq!(batch.snapshot()[0].data_as::<&str>(), Some(&"cached"));
    }

    #[test]
    fn test_pending_delay_without_runtime_is_skipped() {
        let batch = batch(&["/posts"]);
        let loader = loader_of(Route::new("posts").loader(|_| async { Ok::<_, LoaderError>(1_u8) }));
        let mut job = job(0, "/posts", loader);
        job.pending_after = Some(Duration::from_millis(50));

        pollster::block_on(load_matches(&batch, vec![job]));
        let matches = batch.snapshot();
        assert_eq!(matches[0].data_as::<u8>(), Some(&1));
        assert!(!matches[0].is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaders_run_concurrently() {
        let batch = batch(&["/a", "/b"]);
        let start = tokio::time::Instant::now();

        load_matches(
            &batch,
            vec![
                job(0, "/a", delayed(100, "a")),
                job(1, "/b", delayed(100, "b")),
            ],
        )
        .await;

        assert!(start.elapsed() < Duration::from_millis(150));
        let matches = batch.snapshot();
        assert_eq!(matches[0].data_as::<&str>(), Some(&"a"));
        assert_eq!(matches[1].data_as::<&str>(), Some(&"b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_flag_set_only_after_delay() {
        let batch = batch(&["/slow", "/fast"]);
        let mut slow = job(0, "/slow", delayed(300, "slow"));
        slow.pending_after = Some(Duration::from_millis(100));
        let mut fast = job(1, "/fast", delayed(50, "fast"));
        fast.pending_after = Some(Duration::from_millis(100));

        let observe = async {
            tokio::time::sleep(Duration::from_millis(60)).await;
            let early = batch.snapshot();
            assert!(!early[0].is_pending());
            assert_eq!(early[0].status(), MatchStatus::Loading);
            assert_eq!(early[1].status(), MatchStatus::Ready);

            tokio::time::sleep(Duration::from_millis(60)).await;
            let late = batch.snapshot();
            assert!(late[0].is_pending());
            assert!(!late[1].is_pending());
        };

        futures::join!(load_matches(&batch, vec![slow, fast]), observe);

        let settled = batch.snapshot();
        assert_eq!(settled[0].status(), MatchStatus::Ready);
        assert!(!settled[0].is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_batch_drops_results() {
        let flag = CancelFlag::new();
        let batch = LoadBatch::new(
            vec![RouteMatch::new("/a", "/a", RouteParams::new())],
            flag.clone(),
        );

        let cancel = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            flag.cancel();
        };
        futures::join!(load_matches(&batch, vec![job(0, "/a", delayed(100, "a"))]), cancel);

        let matches = batch.snapshot();
        assert_eq!(matches[0].status(), MatchStatus::Loading);
        assert!(matches[0].data().is_none());
    }
}
