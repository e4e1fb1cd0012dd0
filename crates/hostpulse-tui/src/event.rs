//! Terminal and timer events, read in a background tokio task.
//!
//! Ticks only drive the loading spinner, so they are emitted only while
//! the app reports a view still waiting on its first fetch.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Spinner frame rate.
pub const TICK_RATE: Duration = Duration::from_millis(250);
/// Redraw rate (~30 FPS).
pub const RENDER_RATE: Duration = Duration::from_millis(33);

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// The terminal window regained focus; polled data may be old.
    FocusGained,
    /// Spinner frame. Only sent while spinning.
    Tick,
    Render,
}

/// Map a raw crossterm event. Only key presses, resizes and focus gain
/// matter to the dashboard.
fn translate(event: &CrosstermEvent) -> Option<Event> {
    match *event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        CrosstermEvent::FocusGained => Some(Event::FocusGained),
        _ => None,
    }
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    /// `spinning` gates [`Event::Tick`]; the app flips it as views load.
    pub fn new(tick_rate: Duration, render_rate: Duration, spinning: watch::Receiver<bool>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            let mut spinning = spinning;
            let mut event_stream = EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);
            let mut render_interval = tokio::time::interval(render_rate);

            tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            render_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                let ticking = *spinning.borrow();
                let event = tokio::select! {
                    () = task_cancel.cancelled() => break,

                    // Re-evaluate the tick guard as soon as the flag flips.
                    Ok(()) = spinning.changed() => {
                        if *spinning.borrow_and_update() {
                            tick_interval.reset();
                        }
                        continue;
                    }

                    _ = tick_interval.tick(), if ticking => Event::Tick,

                    _ = render_interval.tick() => Event::Render,

                    Some(Ok(raw)) = event_stream.next() => match translate(&raw) {
                        Some(event) => event,
                        None => continue,
                    },
                };

                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, cancel }
    }

    /// `None` once the reader has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
