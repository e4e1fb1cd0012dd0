//! `hostpulse hosts`: the fleet overview.

use serde::Serialize;
use tabled::Tabled;

use hostpulse_core::format::{format_network_speed, host_count_label};
use hostpulse_core::{DashboardAggregate, HostStatus, HostSummary};

use super::Context;
use crate::cli::{HostsArgs, StatusFilter};
use crate::error::{CliError, Target};
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "RAM")]
    ram: String,
    #[tabled(rename = "Disk")]
    disk: String,
    #[tabled(rename = "Up")]
    upload: String,
    #[tabled(rename = "Down")]
    download: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

impl HostRow {
    fn new(h: &HostSummary, color: bool) -> Self {
        Self {
            status: output::status_label(h.status, color),
            id: h.id.clone(),
            hostname: h.hostname.clone(),
            cpu: output::usage_label(h.cpu_usage, color),
            ram: output::usage_label(h.ram_usage, color),
            disk: output::usage_label(h.disk_usage, color),
            upload: format_network_speed(Some(h.network_upload)),
            download: format_network_speed(Some(h.network_download)),
            last_seen: last_seen(h),
        }
    }
}

fn last_seen(h: &HostSummary) -> String {
    h.last_seen_at().map_or_else(
        || h.last_seen.clone(),
        |at| {
            at.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}

// ── Structured report ───────────────────────────────────────────────

/// `--output json|yaml` shape: the aggregate plus every host.
#[derive(Serialize)]
pub struct HostsReport<'a> {
    pub summary: Summary,
    pub hosts: &'a [HostSummary],
}

#[derive(Serialize)]
pub struct Summary {
    #[serde(flatten)]
    pub aggregate: DashboardAggregate,
    pub availability_pct: f64,
}

impl<'a> HostsReport<'a> {
    pub fn new(hosts: &'a [HostSummary]) -> Self {
        let aggregate = DashboardAggregate::from_hosts(hosts);
        Self {
            summary: Summary {
                aggregate,
                availability_pct: aggregate.availability_pct(),
            },
            hosts,
        }
    }
}

/// Host table followed by the aggregate line.
pub fn render_overview(report: &HostsReport<'_>, color: bool) -> String {
    if report.hosts.is_empty() {
        return "No hosts found".into();
    }

    let rows: Vec<HostRow> = report.hosts.iter().map(|h| HostRow::new(h, color)).collect();
    let agg = &report.summary.aggregate;
    let summary = format!(
        "{} · {} online ({:.1}% availability) · {} warning · {} offline · avg CPU {} · avg memory {}",
        host_count_label(agg.total),
        agg.online,
        report.summary.availability_pct,
        agg.warning,
        agg.offline,
        output::usage_label(agg.avg_cpu, color),
        output::usage_label(agg.avg_memory, color),
    );
    format!("{}\n{summary}", output::render_table(&rows))
}

fn matches(filter: StatusFilter, status: HostStatus) -> bool {
    matches!(
        (filter, status),
        (StatusFilter::Online, HostStatus::Online)
            | (StatusFilter::Warning, HostStatus::Warning)
            | (StatusFilter::Offline, HostStatus::Offline)
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context<'_>, args: HostsArgs) -> Result<(), CliError> {
    let mut hosts = ctx
        .client
        .hosts_overview()
        .await
        .map_err(|e| CliError::from_api(e, Target::Overview, ctx.url()))?;

    if let Some(filter) = args.status {
        hosts.retain(|h| matches(filter, h.status));
    }

    let report = HostsReport::new(&hosts);
    let out = output::render_single(
        ctx.global.output,
        &report,
        |r| render_overview(r, ctx.color),
        |r| r.hosts.iter().map(|h| h.id.as_str()).collect::<Vec<_>>().join("\n"),
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
