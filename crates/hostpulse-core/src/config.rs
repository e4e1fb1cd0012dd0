// ── Dashboard configuration ──
//
// Built by the CLI/TUI from hostpulse-config, passed into feeds.
// Core never reads config files.

use std::time::Duration;

use hostpulse_api::{DashboardClient, TransportConfig};

pub use hostpulse_api::DEFAULT_BASE_URL;

use crate::error::CoreError;

/// Default overview poll period.
pub const DEFAULT_OVERVIEW_INTERVAL: Duration = Duration::from_secs(10);
/// Default host detail poll period.
pub const DEFAULT_DETAIL_INTERVAL: Duration = Duration::from_secs(7);
pub const DEFAULT_METRIC_RANGE: &str = "1h";
pub const DEFAULT_METRIC_AGGREGATE: &str = "30s";

/// Everything a feed needs to reach the monitoring service and pace itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Root of the dashboard API, e.g. `http://localhost:8080/api/dashboard`.
    pub base_url: String,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
    pub overview_interval: Duration,
    pub detail_interval: Duration,
    /// Window passed as `range` to metric history requests.
    pub metric_range: String,
    /// Bucket size passed as `aggregate` to metric history requests.
    pub metric_aggregate: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: None,
            overview_interval: DEFAULT_OVERVIEW_INTERVAL,
            detail_interval: DEFAULT_DETAIL_INTERVAL,
            metric_range: DEFAULT_METRIC_RANGE.to_owned(),
            metric_aggregate: DEFAULT_METRIC_AGGREGATE.to_owned(),
        }
    }
}

impl DashboardConfig {
    /// Construct the HTTP client this configuration describes.
    pub fn build_client(&self) -> Result<DashboardClient, CoreError> {
        let transport = TransportConfig::default().with_timeout(self.timeout);
        DashboardClient::new(&self.base_url, &transport).map_err(|source| CoreError::Client {
            url: self.base_url.clone(),
            source,
        })
    }
}
