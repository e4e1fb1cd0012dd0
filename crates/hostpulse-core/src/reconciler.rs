// ── View state reconciler ──
//
// Stale-while-revalidate state for one view. Fetch results are merged in
// through `apply`, guarded by request sequence numbers so a response never
// overwrites one from a later request.

use std::time::Duration;

use chrono::{DateTime, Utc};
use strum::Display;

use crate::error::RequestError;

/// Sequence number handed out by [`ViewState::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// What [`ViewState::apply`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Data replaced, error cleared.
    Updated,
    /// Error recorded, existing data kept.
    Failed,
    /// A newer request was issued after this one; state untouched.
    Discarded,
}

/// Where a view sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ViewPhase {
    /// First fetch still outstanding.
    Initializing,
    /// Showing fresh data.
    Ready,
    /// Showing data from an earlier success; the latest attempt failed.
    ReadyStale,
    /// Nothing has ever loaded and the last attempt failed.
    ErrorNoData,
}

/// Mutable state owned by one view.
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    pub data: Option<T>,
    /// True only until the first result (success or failure) lands.
    pub loading: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    issued: u64,
    /// Sequence of the newest result merged so far.
    applied: u64,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
            last_updated: None,
            issued: 0,
            applied: 0,
        }
    }

    /// Register a new request. `loading` is left alone: polls after the
    /// first never blank the view.
    pub fn begin(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    /// Sequence number of the newest request issued so far.
    pub fn latest_ticket(&self) -> RequestTicket {
        RequestTicket(self.issued)
    }

    /// Merge a fetch result, stamping successes with the current time.
    ///
    /// A result is discarded only if a later request's result has already
    /// been merged; requests still in flight never block it.
    pub fn apply(&mut self, ticket: RequestTicket, result: Result<T, RequestError>) -> ApplyOutcome {
        self.apply_at(ticket, result, Utc::now())
    }

    /// [`apply`](Self::apply) with an explicit timestamp.
    pub fn apply_at(
        &mut self,
        ticket: RequestTicket,
        result: Result<T, RequestError>,
        now: DateTime<Utc>,
    ) -> ApplyOutcome {
        if ticket.0 <= self.applied {
            return ApplyOutcome::Discarded;
        }

        self.applied = ticket.0;
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.last_updated = Some(now);
                ApplyOutcome::Updated
            }
            Err(err) => {
                self.error = Some(err.message);
                ApplyOutcome::Failed
            }
        }
    }

    pub fn phase(&self) -> ViewPhase {
        match (&self.data, &self.error) {
            (None, Some(_)) => ViewPhase::ErrorNoData,
            (None, None) if self.loading => ViewPhase::Initializing,
            (Some(_), Some(_)) => ViewPhase::ReadyStale,
            _ => ViewPhase::Ready,
        }
    }

    /// Showing data from an earlier success after a failed refresh.
    pub fn is_stale(&self) -> bool {
        self.phase() == ViewPhase::ReadyStale
    }

    /// Time since the last successful fetch.
    pub fn data_age(&self) -> Option<Duration> {
        self.last_updated
            .and_then(|at| Utc::now().signed_duration_since(at).to_std().ok())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn fail(msg: &str) -> Result<Vec<u32>, RequestError> {
        Err(RequestError::new(msg))
    }

    #[test]
    fn starts_initializing() {
        let state: ViewState<Vec<u32>> = ViewState::new();
        assert!(state.loading);
        assert_eq!(state.phase(), ViewPhase::Initializing);
        assert!(state.data_age().is_none());
    }

    #[test]
    fn first_success_becomes_ready() {
        let mut state = ViewState::new();
        let t = state.begin();

        assert_eq!(state.apply_at(t, Ok(vec![1, 2, 3]), at(0)), ApplyOutcome::Updated);

        assert_eq!(state.phase(), ViewPhase::Ready);
        assert_eq!(state.data, Some(vec![1, 2, 3]));
        assert!(!state.loading);
        assert_eq!(state.last_updated, Some(at(0)));
    }

    #[test]
    fn first_failure_has_no_data() {
        let mut state: ViewState<Vec<u32>> = ViewState::new();
        let t = state.begin();

        assert_eq!(state.apply(t, fail("connection refused")), ApplyOutcome::Failed);

        assert_eq!(state.phase(), ViewPhase::ErrorNoData);
        assert_eq!(state.data, None);
        assert_eq!(state.error.as_deref(), Some("connection refused"));
        assert!(!state.loading);
    }

    #[test]
    fn failure_after_success_keeps_stale_data() {
        let mut state = ViewState::new();
        let t = state.begin();
        state.apply_at(t, Ok(vec![7]), at(0));

        let t = state.begin();
        assert_eq!(state.phase(), ViewPhase::Ready, "begin must not blank the view");
        state.apply_at(t, fail("HTTP error 502"), at(10));

        assert_eq!(state.phase(), ViewPhase::ReadyStale);
        assert!(state.is_stale());
        assert_eq!(state.data, Some(vec![7]));
        assert_eq!(state.error.as_deref(), Some("HTTP error 502"));
        assert_eq!(state.last_updated, Some(at(0)));
    }

    #[test]
    fn success_clears_previous_error() {
        let mut state = ViewState::new();
        let t = state.begin();
        state.apply(t, fail("timeout"));

        let t = state.begin();
        state.apply_at(t, Ok(vec![4, 5]), at(20));

        assert_eq!(state.phase(), ViewPhase::Ready);
        assert_eq!(state.error, None);
        assert_eq!(state.data, Some(vec![4, 5]));
    }

    #[test]
    fn superseded_response_is_discarded() {
        let mut state = ViewState::new();
        let slow = state.begin();
        let fast = state.begin();

        assert_eq!(state.apply_at(fast, Ok(vec![2]), at(1)), ApplyOutcome::Updated);
        assert_eq!(state.apply_at(slow, Ok(vec![1]), at(2)), ApplyOutcome::Discarded);

        assert_eq!(state.data, Some(vec![2]));
        assert_eq!(state.last_updated, Some(at(1)));
    }

    #[test]
    fn superseded_failure_cannot_mark_stale() {
        let mut state = ViewState::new();
        let t = state.begin();
        state.apply(t, Ok(vec![1]));

        let old = state.begin();
        let new = state.begin();
        state.apply(new, Ok(vec![9]));

        assert_eq!(state.apply(old, fail("late")), ApplyOutcome::Discarded);
        assert_eq!(state.error, None);
        assert_eq!(state.phase(), ViewPhase::Ready);
    }

    #[test]
    fn response_applies_while_newer_request_in_flight() {
        let mut state: ViewState<Vec<u32>> = ViewState::new();
        let first = state.begin();
        let second = state.begin();

        assert_eq!(state.apply_at(first, Ok(vec![1]), at(0)), ApplyOutcome::Updated);
        assert_eq!(state.phase(), ViewPhase::Ready);
        assert_eq!(state.latest_ticket().sequence(), 2);

        assert_eq!(state.apply_at(second, Ok(vec![2]), at(5)), ApplyOutcome::Updated);
        assert_eq!(state.data, Some(vec![2]));
    }

    #[test]
    fn first_failure_lands_while_polls_pile_up() {
        let mut state: ViewState<Vec<u32>> = ViewState::new();
        let first = state.begin();
        let _second = state.begin();
        let _third = state.begin();

        assert_eq!(state.apply(first, fail("connection reset")), ApplyOutcome::Failed);
        assert_eq!(state.phase(), ViewPhase::ErrorNoData);
    }

    #[test]
    fn repeated_ticket_is_discarded() {
        let mut state = ViewState::new();
        let t = state.begin();
        state.apply_at(t, Ok(vec![1]), at(0));

        assert_eq!(state.apply_at(t, Ok(vec![9]), at(1)), ApplyOutcome::Discarded);
        assert_eq!(state.data, Some(vec![1]));
    }

    #[test]
    fn phase_display_is_kebab_case() {
        assert_eq!(ViewPhase::ErrorNoData.to_string(), "error-no-data");
        assert_eq!(ViewPhase::ReadyStale.to_string(), "ready-stale");
    }
}
