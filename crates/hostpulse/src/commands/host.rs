//! `hostpulse host <id>`: detail cards and top processes.

use tabled::Tabled;

use hostpulse_core::HostDetail;
use hostpulse_core::format::{format_gb, format_network_speed, format_percent, or_na};

use super::Context;
use crate::cli::HostArgs;
use crate::error::{CliError, Target};
use crate::output;

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "PID")]
    pid: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "CPU %")]
    cpu: String,
    #[tabled(rename = "Mem %")]
    mem: String,
}

fn os_line(d: &HostDetail) -> String {
    let os = &d.os;
    let name = match (os.name.as_deref(), os.version.as_deref()) {
        (Some(n), Some(v)) if !v.trim().is_empty() => format!("{n} {v}"),
        (n, _) => or_na(n).to_owned(),
    };
    format!(
        "{name} (kernel {}, {})",
        or_na(os.kernel.as_deref()),
        or_na(os.architecture.as_deref())
    )
}

fn detail(d: &HostDetail, color: bool) -> String {
    let cpu_model = or_na(Some(d.cpu.model_name.as_str()));
    let mut lines = vec![
        format!("Host:      {} ({})", d.hostname, d.id),
        format!("Status:    {}", output::status_label(d.status, color)),
        format!("Last seen: {}", d.last_seen),
        format!("OS:        {}", os_line(d)),
        format!(
            "CPU:       {} cores, {cpu_model}, usage {}",
            d.cpu.cores,
            output::usage_label(d.cpu_usage, color)
        ),
        format!(
            "Memory:    {} used / {} total, {} free ({})",
            format_gb(d.memory.used),
            format_gb(d.memory.total),
            format_gb(d.memory.free),
            output::usage_label(d.ram_usage, color)
        ),
        format!(
            "Disk:      {} {} used / {} total ({})",
            or_na(Some(d.disk.path.as_str())),
            format_gb(d.disk.used_gb),
            format_gb(d.disk.total_gb),
            output::usage_label(d.disk.usage_percent, color)
        ),
        format!(
            "Network:   up {} / down {}",
            format_network_speed(Some(d.network_upload)),
            format_network_speed(Some(d.network_download))
        ),
        String::new(),
    ];

    let processes = d.processes();
    if processes.is_empty() {
        lines.push(output::dim("No high-usage processes reported recently.", color));
    } else {
        let rows: Vec<ProcessRow> = processes
            .iter()
            .map(|p| ProcessRow {
                pid: p.pid,
                name: p.name.clone(),
                cpu: format_percent(p.cpu_usage),
                mem: format_percent(p.memory_usage),
            })
            .collect();
        lines.push(output::render_table(&rows));
    }
    lines.join("\n")
}

pub async fn handle(ctx: &Context<'_>, args: HostArgs) -> Result<(), CliError> {
    let host_id = args.host_id.trim();
    if host_id.is_empty() {
        return Err(CliError::Validation {
            field: "host_id".into(),
            reason: "Host ID is missing.".into(),
        });
    }

    let details = ctx
        .client
        .host_details(host_id)
        .await
        .map_err(|e| CliError::from_api(e, Target::Host(host_id), ctx.url()))?;

    let out = output::render_single(
        ctx.global.output,
        &details,
        |d| detail(d, ctx.color),
        |d| d.id.clone(),
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> HostDetail {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_os_fields_show_na() {
        let d = parse(r#"{ "id": "h1", "hostname": "h1.lan", "os": { "name": "Debian" } }"#);
        assert_eq!(os_line(&d), "Debian (kernel N/A, N/A)");
        let text = detail(&d, false);
        assert!(text.contains("No high-usage processes reported recently."));
    }

    #[test]
    fn processes_render_as_table() {
        let d = parse(
            r#"{ "id": "h1", "processes": [
                { "pid": 7, "name": "postgres", "cpuUsage": 33.3, "memoryUsage": 12.0 }
            ] }"#,
        );
        let text = detail(&d, false);
        assert!(text.contains("postgres"));
        assert!(text.contains("33.3%"));
        assert!(!text.contains("No high-usage processes"));
    }
}
