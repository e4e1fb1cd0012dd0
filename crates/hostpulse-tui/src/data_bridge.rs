//! Data bridge: forwards feed state changes to TUI actions.
//!
//! Each open feed gets one background task that watches its state channel
//! and sends every change (including the current state on start) as an
//! [`Action`]. Cancelling the token ends the task.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use hostpulse_core::{HostSnapshot, HostSummary, ViewState};

use crate::action::Action;

/// Forward `rx` through `map` until cancelled or the feed goes away.
pub async fn forward<T, F>(
    mut rx: watch::Receiver<ViewState<T>>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
    map: F,
) where
    T: Clone + Send + Sync,
    F: Fn(ViewState<T>) -> Action + Send,
{
    let initial = rx.borrow_and_update().clone();
    if action_tx.send(map(initial)).is_err() {
        return;
    }

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if action_tx.send(map(state)).is_err() {
                    break;
                }
            }
        }
    }
}

/// Spawn the bridge for the overview feed.
pub fn spawn_overview(
    rx: watch::Receiver<ViewState<Vec<HostSummary>>>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        forward(rx, action_tx, cancel, Action::OverviewUpdated).await;
        debug!(feed = "overview", "data bridge stopped");
    });
}

/// Spawn the bridge for one host's detail feed.
pub fn spawn_host(
    host_id: String,
    rx: watch::Receiver<ViewState<HostSnapshot>>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let name = format!("host:{host_id}");
    tokio::spawn(async move {
        let map = move |state| Action::HostUpdated {
            host_id: host_id.clone(),
            state,
        };
        forward(rx, action_tx, cancel, map).await;
        debug!(feed = %name, "data bridge stopped");
    });
}
