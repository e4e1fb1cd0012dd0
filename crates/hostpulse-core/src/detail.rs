// ── Host detail cycle ──
//
// One refresh of the host detail view: the host record plus four metric
// series, fetched concurrently and delivered as a single snapshot.

use serde::Serialize;
use tracing::debug;

use hostpulse_api::{DashboardClient, HostDetail, MetricName, MetricSample};

use crate::error::RequestError;

/// Everything the host detail view renders, from one fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSnapshot {
    pub details: HostDetail,
    pub cpu: Vec<MetricSample>,
    pub memory: Vec<MetricSample>,
    pub net_upload: Vec<MetricSample>,
    pub net_download: Vec<MetricSample>,
}

impl HostSnapshot {
    /// Series for one of the four detail metrics. Custom metrics are not
    /// part of the snapshot and yield an empty slice.
    pub fn series(&self, metric: &MetricName) -> &[MetricSample] {
        match metric {
            MetricName::CpuUsagePercent => &self.cpu,
            MetricName::MemUsagePercent => &self.memory,
            MetricName::NetUploadBytesSec => &self.net_upload,
            MetricName::NetDownloadBytesSec => &self.net_download,
            MetricName::Custom(_) => &[],
        }
    }
}

/// Fetch details and the four standard series for `host_id`.
///
/// All five requests run concurrently and this resolves only after every
/// one has settled. Any failure fails the whole cycle (first error in
/// request order); partial results are never returned.
pub async fn fetch_host_snapshot(
    client: &DashboardClient,
    host_id: &str,
    range: &str,
    aggregate: &str,
) -> Result<HostSnapshot, RequestError> {
    if host_id.trim().is_empty() {
        return Err(RequestError::missing_host_id());
    }

    debug!(host_id, range, aggregate, "fetching host snapshot");
    let [cpu_metric, mem_metric, up_metric, down_metric] = MetricName::ALL;
    let (details, cpu, memory, net_upload, net_download) = tokio::join!(
        client.host_details(host_id),
        client.host_metric_history(host_id, &cpu_metric, range, aggregate),
        client.host_metric_history(host_id, &mem_metric, range, aggregate),
        client.host_metric_history(host_id, &up_metric, range, aggregate),
        client.host_metric_history(host_id, &down_metric, range, aggregate),
    );

    Ok(HostSnapshot {
        details: details?,
        cpu: cpu?,
        memory: memory?,
        net_upload: net_upload?,
        net_download: net_download?,
    })
}
