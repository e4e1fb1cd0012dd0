// ── Live feeds ──
//
// A feed binds one fetch operation to a reconciled `ViewState`, an
// immediate first fetch, and a poller. Views subscribe to the watch
// channel and re-render on every change.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use hostpulse_api::{DashboardClient, HostSummary};

use crate::config::DashboardConfig;
use crate::detail::{HostSnapshot, fetch_host_snapshot};
use crate::error::{CoreError, RequestError};
use crate::poller::Poller;
use crate::reconciler::{ApplyOutcome, ViewState};

type FetchFn<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, RequestError>> + Send + Sync>;

struct FeedShared<T> {
    name: String,
    state: watch::Sender<ViewState<T>>,
    fetch: FetchFn<T>,
    stopped: CancellationToken,
}

impl<T: Send + Sync + 'static> FeedShared<T> {
    /// Issue a ticket now, then fetch and apply.
    ///
    /// The ticket is taken synchronously so sequence order matches call
    /// order, whatever order the responses arrive in.
    fn cycle(self: &Arc<Self>) -> impl Future<Output = ApplyOutcome> + Send + use<T> {
        let shared = Arc::clone(self);
        let mut ticket = None;
        // Issuing a ticket is bookkeeping only; subscribers are not woken.
        self.state.send_if_modified(|s| {
            ticket = Some(s.begin());
            false
        });
        let fetch = (self.fetch)();

        async move {
            let Some(ticket) = ticket else {
                return ApplyOutcome::Discarded;
            };
            if shared.stopped.is_cancelled() {
                return ApplyOutcome::Discarded;
            }

            let result = fetch.await;

            if shared.stopped.is_cancelled() {
                debug!(feed = %shared.name, "feed stopped, dropping result");
                return ApplyOutcome::Discarded;
            }
            if let Err(ref e) = result {
                warn!(feed = %shared.name, error = %e, "refresh failed");
            }

            let mut outcome = ApplyOutcome::Discarded;
            shared.state.send_if_modified(|s| {
                outcome = s.apply(ticket, result);
                outcome != ApplyOutcome::Discarded
            });
            if outcome == ApplyOutcome::Discarded {
                debug!(
                    feed = %shared.name,
                    seq = ticket.sequence(),
                    "superseded response discarded"
                );
            }
            outcome
        }
    }
}

/// A polled, reconciled view of one remote resource.
///
/// Stops polling and ignores in-flight results once [`stop`](Self::stop)
/// is called or the feed is dropped.
pub struct Feed<T> {
    shared: Arc<FeedShared<T>>,
    poller: Poller,
}

impl<T: Clone + Send + Sync + 'static> Feed<T> {
    /// Spawn the first fetch immediately, then poll every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(
        name: impl Into<String>,
        fetch: F,
        interval: Duration,
    ) -> Result<Self, CoreError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RequestError>> + Send + 'static,
    {
        let (state, _) = watch::channel(ViewState::new());
        let shared = Arc::new(FeedShared {
            name: name.into(),
            state,
            fetch: Arc::new(move || fetch().boxed()),
            stopped: CancellationToken::new(),
        });

        let poller = Poller::schedule(Self::poll_op(&shared), interval)?;
        debug!(feed = %shared.name, interval_ms = interval.as_millis(), "feed started");
        tokio::spawn(shared.cycle());

        Ok(Self { shared, poller })
    }

    fn poll_op(
        shared: &Arc<FeedShared<T>>,
    ) -> impl Fn() -> BoxFuture<'static, ()> + Send + Sync + use<T> {
        let shared = Arc::clone(shared);
        move || shared.cycle().map(|_| ()).boxed()
    }

    /// Manual refresh, resolved once the result has been applied (or
    /// discarded). Not de-duplicated against scheduled polls.
    pub async fn refresh(&self) -> ApplyOutcome {
        self.shared.cycle().await
    }

    /// Manual refresh on a background task.
    pub fn spawn_refresh(&self) -> JoinHandle<ApplyOutcome> {
        tokio::spawn(self.shared.cycle())
    }

    /// Change the poll period. The old timer is cancelled first.
    pub fn set_interval(&mut self, interval: Duration) -> Result<(), CoreError> {
        self.poller.reschedule(Self::poll_op(&self.shared), interval)
    }

    pub fn interval(&self) -> Duration {
        self.poller.interval()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState<T>> {
        self.shared.state.subscribe()
    }

    /// Stream of states, starting with the current one.
    pub fn stream(&self) -> WatchStream<ViewState<T>> {
        WatchStream::new(self.subscribe())
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> ViewState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Tear down: no further polls, no further state changes.
    pub fn stop(&mut self) {
        self.shared.stopped.cancel();
        self.poller.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.is_cancelled()
    }
}

impl<T> Drop for Feed<T> {
    fn drop(&mut self) {
        self.shared.stopped.cancel();
    }
}

// ── Constructors ─────────────────────────────────────────────────────

/// Feed for the host overview, polled at `config.overview_interval`.
pub fn overview_feed(
    client: DashboardClient,
    config: &DashboardConfig,
) -> Result<Feed<Vec<HostSummary>>, CoreError> {
    Feed::start(
        "overview",
        move || {
            let client = client.clone();
            async move { client.hosts_overview().await.map_err(RequestError::from) }
        },
        config.overview_interval,
    )
}

/// Feed for one host's detail view, polled at `config.detail_interval`.
pub fn host_feed(
    client: DashboardClient,
    host_id: impl Into<String>,
    config: &DashboardConfig,
) -> Result<Feed<HostSnapshot>, CoreError> {
    let host_id: Arc<str> = host_id.into().into();
    let range: Arc<str> = config.metric_range.as_str().into();
    let aggregate: Arc<str> = config.metric_aggregate.as_str().into();

    Feed::start(
        format!("host:{host_id}"),
        move || {
            let client = client.clone();
            let host_id = Arc::clone(&host_id);
            let range = Arc::clone(&range);
            let aggregate = Arc::clone(&aggregate);
            async move { fetch_host_snapshot(&client, &host_id, &range, &aggregate).await }
        },
        config.detail_interval,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;
    use tokio::time::sleep;

    use super::*;
    use crate::reconciler::ViewPhase;

    /// Fetch that answers from a script of results, one per call.
    fn scripted(
        results: Vec<Result<u32, RequestError>>,
    ) -> (
        impl Fn() -> std::future::Ready<Result<u32, RequestError>> + Send + Sync + use<>,
        Arc<AtomicUsize>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let results = Mutex::new(results.into_iter());
        let op = move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let next = results
                .lock()
                .unwrap()
                .next()
                .unwrap_or_else(|| Err(RequestError::new("script exhausted")));
            std::future::ready(next)
        };
        (op, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn first_fetch_is_immediate_then_polled() {
        let (op, calls) = scripted(vec![Ok(1), Ok(2), Ok(3)]);
        let feed = Feed::start("test", op, Duration::from_secs(10)).unwrap();

        sleep(Duration::from_millis(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(feed.snapshot().data, Some(1));

        sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(feed.snapshot().data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_keeps_stale_data() {
        let (op, _) = scripted(vec![Ok(7), Err(RequestError::new("network down"))]);
        let feed = Feed::start("test", op, Duration::from_secs(5)).unwrap();

        sleep(Duration::from_secs(6)).await;
        let state = feed.snapshot();
        assert_eq!(state.phase(), ViewPhase::ReadyStale);
        assert_eq!(state.data, Some(7));
        assert_eq!(state.error.as_deref(), Some("network down"));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_refresh_applies_result() {
        let (op, calls) = scripted(vec![Err(RequestError::new("boom")), Ok(42)]);
        let feed = Feed::start("test", op, Duration::from_secs(60)).unwrap();

        sleep(Duration::from_millis(1)).await;
        assert_eq!(feed.snapshot().phase(), ViewPhase::ErrorNoData);

        assert_eq!(feed.refresh().await, ApplyOutcome::Updated);
        assert_eq!(feed.snapshot().data, Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_feed_ignores_in_flight_result() {
        let (tx, rx) = oneshot::channel::<Result<u32, RequestError>>();
        let rx = Mutex::new(Some(rx));
        let mut feed = Feed::start(
            "test",
            move || {
                let rx = rx.lock().unwrap().take();
                async move {
                    match rx {
                        Some(rx) => rx.await.unwrap_or_else(|_| Err(RequestError::new("closed"))),
                        None => Err(RequestError::new("unexpected second call")),
                    }
                }
            },
            Duration::from_secs(5),
        )
        .unwrap();

        sleep(Duration::from_millis(1)).await;
        feed.stop();
        tx.send(Ok(9)).unwrap();
        sleep(Duration::from_secs(30)).await;

        let state = feed.snapshot();
        assert!(feed.is_stopped());
        assert_eq!(state.data, None);
        assert_eq!(state.error, None);
        assert_eq!(state.phase(), ViewPhase::Initializing);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_response_is_superseded_by_newer_request() {
        let (slow_tx, slow_rx) = oneshot::channel::<Result<u32, RequestError>>();
        let slow = Mutex::new(Some(slow_rx));
        let feed = Feed::start(
            "test",
            move || {
                let slow = slow.lock().unwrap().take();
                async move {
                    match slow {
                        Some(rx) => rx.await.unwrap_or_else(|_| Err(RequestError::new("closed"))),
                        None => Ok(2),
                    }
                }
            },
            Duration::from_secs(60),
        )
        .unwrap();

        sleep(Duration::from_millis(1)).await;
        assert_eq!(feed.refresh().await, ApplyOutcome::Updated);
        assert_eq!(feed.snapshot().data, Some(2));

        slow_tx.send(Ok(1)).unwrap();
        sleep(Duration::from_millis(1)).await;
        assert_eq!(feed.snapshot().data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_failures_still_reach_error_state() {
        let feed = Feed::start(
            "test",
            || async {
                sleep(Duration::from_secs(7)).await;
                Err::<u32, _>(RequestError::new("upstream timeout"))
            },
            Duration::from_secs(5),
        )
        .unwrap();

        sleep(Duration::from_secs(120)).await;
        let state = feed.snapshot();
        assert_eq!(state.phase(), ViewPhase::ErrorNoData);
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("upstream timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_successes_keep_updating() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let feed = Feed::start(
            "test",
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    sleep(Duration::from_secs(7)).await;
                    Ok::<_, RequestError>(n)
                }
            },
            Duration::from_secs(5),
        )
        .unwrap();

        sleep(Duration::from_secs(8)).await;
        assert_eq!(feed.snapshot().data, Some(1));

        sleep(Duration::from_secs(112)).await;
        let state = feed.snapshot();
        assert_eq!(state.phase(), ViewPhase::Ready);
        assert!(state.data.unwrap() > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn set_interval_rebinds_poller() {
        let (op, calls) = scripted(vec![Ok(1), Ok(2), Ok(3), Ok(4)]);
        let mut feed = Feed::start("test", op, Duration::from_secs(100)).unwrap();
        sleep(Duration::from_millis(1)).await;

        feed.set_interval(Duration::from_secs(3)).unwrap();
        assert_eq!(feed.interval(), Duration::from_secs(3));
        sleep(Duration::from_millis(7_000)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let (op, _) = scripted(vec![]);
        let result = Feed::start("test", op, Duration::ZERO);
        assert!(matches!(result, Err(CoreError::InvalidInterval)));
    }
}
