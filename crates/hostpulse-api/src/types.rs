//! Response types for the dashboard HTTP API.
//!
//! Field names match the monitoring service's JSON. Most fields are
//! camelCase; the nested hardware records use snake_case on the wire.
//! Numeric fields tolerate `null` and absence, decoding to zero.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display};

/// Decode `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Host status ──────────────────────────────────────────────────────

/// Liveness classification assigned by the monitoring service.
///
/// Unrecognized values decode as [`HostStatus::Offline`], the most
/// conservative reading.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HostStatus {
    Online,
    Warning,
    #[default]
    #[serde(other)]
    Offline,
}

// ── Overview ─────────────────────────────────────────────────────────

/// One host row from `GET /hosts/overview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hostname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: HostStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_usage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ram_usage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disk_usage: f64,
    /// Bytes per second.
    #[serde(default, deserialize_with = "null_as_default")]
    pub network_upload: f64,
    /// Bytes per second.
    #[serde(default, deserialize_with = "null_as_default")]
    pub network_download: f64,
    /// ISO 8601 timestamp, kept verbatim.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_seen: String,
}

impl HostSummary {
    /// Parsed `last_seen`, or `None` if the service sent something unparseable.
    pub fn last_seen_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_seen)
    }
}

// ── Details ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cores: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
}

/// Memory totals, in GB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub free: f64,
}

/// Root filesystem usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_gb: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_gb: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub free_gb: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage_percent: f64,
}

/// Operating system description. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingSystemInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub kernel: Option<String>,
    #[serde(default, rename = "kernelArch")]
    pub architecture: Option<String>,
}

/// One entry of the service's top-N process snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSample {
    pub pid: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_usage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory_usage: f64,
}

/// Full host record from `GET /host/{id}/details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDetail {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hostname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: HostStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_seen: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu: CpuInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memory: MemoryInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub disk: DiskInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub os: OperatingSystemInfo,
    /// Top-N snapshot, not a full process list.
    #[serde(default)]
    pub processes: Option<Vec<ProcessSample>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cpu_usage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ram_usage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub network_upload: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub network_download: f64,
}

impl HostDetail {
    pub fn last_seen_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_seen)
    }

    /// Reported processes, empty when the service sent none.
    pub fn processes(&self) -> &[ProcessSample] {
        self.processes.as_deref().unwrap_or_default()
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>().ok()
}

// ── Metric history ───────────────────────────────────────────────────

/// One point of a metric series. `timestamp` is an opaque display label
/// (the service sends e.g. `"14:05"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

/// Metric identifier for `GET /host/{id}/metrics/{metric}`.
///
/// The four well-known names are modeled explicitly. Anything else is
/// carried through as [`MetricName::Custom`] and left for the server to
/// accept or reject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MetricName {
    CpuUsagePercent,
    MemUsagePercent,
    NetUploadBytesSec,
    NetDownloadBytesSec,
    Custom(String),
}

impl MetricName {
    /// The four series shown on the host detail view, in display order.
    pub const ALL: [Self; 4] = [
        Self::CpuUsagePercent,
        Self::MemUsagePercent,
        Self::NetUploadBytesSec,
        Self::NetDownloadBytesSec,
    ];

    /// Wire identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::CpuUsagePercent => "cpu_usage_percent",
            Self::MemUsagePercent => "mem_usage_percent",
            Self::NetUploadBytesSec => "net_upload_bytes_sec",
            Self::NetDownloadBytesSec => "net_download_bytes_sec",
            Self::Custom(name) => name,
        }
    }

    /// Whether the series is a byte rate rather than a percentage.
    pub fn is_rate(&self) -> bool {
        matches!(self, Self::NetUploadBytesSec | Self::NetDownloadBytesSec)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<String> for MetricName {
    fn from(value: String) -> Self {
        match value.as_str() {
            "cpu_usage_percent" => Self::CpuUsagePercent,
            "mem_usage_percent" => Self::MemUsagePercent,
            "net_upload_bytes_sec" => Self::NetUploadBytesSec,
            "net_download_bytes_sec" => Self::NetDownloadBytesSec,
            _ => Self::Custom(value),
        }
    }
}

impl From<MetricName> for String {
    fn from(value: MetricName) -> Self {
        match value {
            MetricName::Custom(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}
