//! Polling and data-freshness layer between `hostpulse-api` and the CLI / TUI.
//!
//! - **[`Poller`]**: invokes an operation on a fixed period, starting one
//!   period after scheduling. Cancelled on drop or reschedule; calls may
//!   overlap.
//!
//! - **[`ViewState`]**: stale-while-revalidate state for one view. Results
//!   are applied through [`RequestTicket`]s so only the most recently
//!   issued request can change what is shown.
//!
//! - **[`Feed`]**: a `ViewState` published on a `tokio::sync::watch`
//!   channel, fed by an immediate fetch plus a `Poller`.
//!   [`overview_feed`] and [`host_feed`] build the two dashboard views.
//!
//! - **Derived data**: [`DashboardAggregate`] for the overview,
//!   [`classify_usage`] thresholds, and display formatting in [`format`].

pub mod classify;
pub mod config;
pub mod detail;
pub mod error;
pub mod feed;
pub mod format;
pub mod overview;
pub mod poller;
pub mod reconciler;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::{UsageLevel, classify_usage};
pub use config::DashboardConfig;
pub use detail::{HostSnapshot, fetch_host_snapshot};
pub use error::{CoreError, RequestError};
pub use feed::{Feed, host_feed, overview_feed};
pub use overview::DashboardAggregate;
pub use poller::Poller;
pub use reconciler::{ApplyOutcome, RequestTicket, ViewPhase, ViewState};

pub use hostpulse_api;

// Wire types consumers need alongside the core API.
pub use hostpulse_api::{
    DashboardClient, HostDetail, HostStatus, HostSummary, MetricName, MetricSample, ProcessSample,
};
