// hostpulse-api: Async Rust client for the hostpulse dashboard HTTP API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{DEFAULT_BASE_URL, DashboardClient};
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{
    CpuInfo, DiskInfo, HostDetail, HostStatus, HostSummary, MemoryInfo, MetricName, MetricSample,
    OperatingSystemInfo, ProcessSample,
};
