// ── Polling controller ──
//
// Invokes an operation on a fixed period for as long as the owning view
// lives. The first invocation happens one full period after scheduling;
// callers perform their own immediate fetch.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::CoreError;

type PollFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// A running schedule. Cancelled on [`cancel`](Self::cancel), on
/// [`reschedule`](Self::reschedule), and on drop.
pub struct Poller {
    interval: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start invoking `op` every `interval`.
    ///
    /// Each invocation's future is spawned on its own task, so a slow call
    /// never delays the next tick and calls may overlap.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(op: F, interval: Duration) -> Result<Self, CoreError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let op: PollFn = Arc::new(move || op().boxed());
        let cancel = CancellationToken::new();
        let handle = spawn_ticker(op, interval, cancel.clone())?;
        Ok(Self {
            interval,
            cancel,
            handle: Some(handle),
        })
    }

    /// Replace the operation and/or period. The previous timer is cancelled
    /// before the new one starts, so the old operation never fires again.
    pub fn reschedule<F, Fut>(&mut self, op: F, interval: Duration) -> Result<(), CoreError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if interval.is_zero() {
            return Err(CoreError::InvalidInterval);
        }
        self.cancel();

        let op: PollFn = Arc::new(move || op().boxed());
        let cancel = CancellationToken::new();
        self.handle = Some(spawn_ticker(op, interval, cancel.clone())?);
        self.cancel = cancel;
        self.interval = interval;
        Ok(())
    }

    /// Stop the timer. No further invocations happen after this returns;
    /// invocations already in flight run to completion.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn spawn_ticker(
    op: PollFn,
    period: Duration,
    cancel: CancellationToken,
) -> Result<JoinHandle<()>, CoreError> {
    if period.is_zero() {
        return Err(CoreError::InvalidInterval);
    }

    // Default burst behaviour keeps the count at floor(elapsed / period)
    // even after the runtime stalls.
    let mut ticker = interval_at(Instant::now() + period, period);

    Ok(tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    trace!(period_ms = period.as_millis(), "poll tick");
                    tokio::spawn(op());
                }
            }
        }
    }))
}
