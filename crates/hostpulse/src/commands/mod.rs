//! Command dispatch: bridges CLI args -> dashboard requests -> output.

pub mod config_cmd;
pub mod host;
pub mod hosts;
pub mod metrics;
pub mod watch;

use hostpulse_core::{DashboardClient, DashboardConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Everything a service-bound command needs.
pub struct Context<'a> {
    pub client: DashboardClient,
    pub dashboard: DashboardConfig,
    pub global: &'a GlobalOpts,
    pub color: bool,
}

impl<'a> Context<'a> {
    pub fn new(dashboard: DashboardConfig, global: &'a GlobalOpts) -> Result<Self, CliError> {
        let client = dashboard.build_client()?;
        Ok(Self {
            client,
            dashboard,
            global,
            color: output::should_color(global.color),
        })
    }

    /// Base URL for error reporting.
    pub fn url(&self) -> &str {
        self.client.base_url().as_str()
    }
}

/// Dispatch a service-bound command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Hosts(args) => hosts::handle(ctx, args).await,
        Command::Host(args) => host::handle(ctx, args).await,
        Command::Metrics(args) => metrics::handle(ctx, args).await,
        Command::Watch(args) => watch::handle(ctx, args).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before dispatch".into(),
        }),
    }
}
