// ── Overview aggregates ──
//
// Derived counts and averages for the host overview. Never cached: every
// render recomputes from the collection it was handed.

use serde::Serialize;

use hostpulse_api::{HostStatus, HostSummary};

/// Fleet-wide summary of one overview snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardAggregate {
    pub total: usize,
    pub online: usize,
    pub warning: usize,
    pub offline: usize,
    /// Mean `cpu_usage` across all hosts; 0 with no hosts.
    pub avg_cpu: f64,
    /// Mean `ram_usage` across all hosts; 0 with no hosts.
    pub avg_memory: f64,
}

impl DashboardAggregate {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn from_hosts(hosts: &[HostSummary]) -> Self {
        let mut agg = Self {
            total: hosts.len(),
            ..Self::default()
        };

        let mut cpu_sum = 0.0;
        let mut mem_sum = 0.0;
        for host in hosts {
            match host.status {
                HostStatus::Online => agg.online += 1,
                HostStatus::Warning => agg.warning += 1,
                HostStatus::Offline => agg.offline += 1,
            }
            cpu_sum += host.cpu_usage;
            mem_sum += host.ram_usage;
        }

        if agg.total > 0 {
            agg.avg_cpu = cpu_sum / agg.total as f64;
            agg.avg_memory = mem_sum / agg.total as f64;
        }
        agg
    }

    /// Share of hosts reporting online, as a percentage. 0 with no hosts.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn availability_pct(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.online as f64 / self.total as f64 * 100.0
    }
}
