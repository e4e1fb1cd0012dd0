//! `hostpulse-tui`: live terminal dashboard for host health.
//!
//! Built on [ratatui](https://ratatui.rs) with polled, reconciled feeds
//! from `hostpulse-core`. The overview screen lists every host; Enter
//! opens a detail screen with history charts for the selected one.
//!
//! Logs go to a file (default `/tmp/hostpulse-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
#[cfg(test)]
mod test_support;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use hostpulse_core::DashboardConfig;

use crate::app::App;

/// Terminal dashboard for monitoring host health.
#[derive(Parser, Debug)]
#[command(name = "hostpulse-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short = 'p', long, env = "HOSTPULSE_PROFILE")]
    profile: Option<String>,

    /// Dashboard API base URL (overrides the profile)
    #[arg(short = 'u', long, env = "HOSTPULSE_URL")]
    url: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/hostpulse-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. The returned guard must live until exit so
/// buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hostpulse_tui={log_level},hostpulse_core={log_level},hostpulse_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("hostpulse-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Profile from the config file, then the `--url` override.
fn resolve_dashboard(cli: &Cli) -> Result<DashboardConfig> {
    let cfg = hostpulse_config::load_config()?;
    let mut dashboard = hostpulse_config::resolve_profile(&cfg, cli.profile.as_deref())?;
    if let Some(ref url) = cli.url {
        dashboard.base_url = hostpulse_config::validate_base_url(url)?;
    }
    Ok(dashboard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_tracing(&cli);
    tui::install_hooks()?;

    let dashboard = resolve_dashboard(&cli)?;
    let client = dashboard.build_client()?;
    info!(
        base_url = %dashboard.base_url,
        overview_interval = ?dashboard.overview_interval,
        detail_interval = ?dashboard.detail_interval,
        "starting hostpulse-tui"
    );

    let mut app = App::new(client, dashboard);
    app.run().await
}
