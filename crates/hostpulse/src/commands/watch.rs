//! `hostpulse watch`: poll the overview until interrupted.

use std::time::Duration;

use tokio_stream::StreamExt;

use hostpulse_core::{HostSummary, ViewPhase, ViewState, overview_feed};

use super::Context;
use super::hosts::{HostsReport, render_overview};
use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output;

pub async fn handle(ctx: &Context<'_>, args: WatchArgs) -> Result<(), CliError> {
    let mut dashboard = ctx.dashboard.clone();
    if let Some(secs) = args.interval {
        dashboard.overview_interval = Duration::from_secs(secs);
    }

    let mut feed = overview_feed(ctx.client.clone(), &dashboard)?;
    let mut updates = feed.stream();
    tracing::info!(interval = ?feed.interval(), "watching overview");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            next = updates.next() => {
                let Some(state) = next else { break };
                print_state(ctx, &state)?;
            }
        }
    }

    feed.stop();
    Ok(())
}

fn print_state(ctx: &Context<'_>, state: &ViewState<Vec<HostSummary>>) -> Result<(), CliError> {
    let quiet = ctx.global.quiet;
    match state.phase() {
        ViewPhase::Initializing => {}
        ViewPhase::ErrorNoData => {
            let msg = state.error.as_deref().unwrap_or_default();
            eprintln!("Connection Error: {msg}");
        }
        phase => {
            let hosts = state.data.as_deref().unwrap_or_default();
            let report = HostsReport::new(hosts);
            let out = output::render_single(
                ctx.global.output,
                &report,
                |r| render_overview(r, ctx.color),
                |r| r.hosts.iter().map(|h| h.id.as_str()).collect::<Vec<_>>().join("\n"),
            )?;
            if !quiet {
                let stamp = state.last_updated.map_or_else(
                    || "never".into(),
                    |at| at.with_timezone(&chrono::Local).format("%H:%M:%S").to_string(),
                );
                println!("{}", output::dim(&format!("── Last updated {stamp} ──"), ctx.color));
            }
            output::print_output(&out, quiet);
            if phase == ViewPhase::ReadyStale {
                let msg = state.error.as_deref().unwrap_or_default();
                eprintln!("Update failed - showing cached data ({msg})");
            }
        }
    }
    Ok(())
}
