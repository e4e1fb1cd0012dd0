//! Clap derive structures for the `hostpulse` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so this module
//! may only depend on clap and clap_complete.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hostpulse -- query and watch a host monitoring dashboard
#[derive(Debug, Parser)]
#[command(
    name = "hostpulse",
    version,
    about = "Query and watch host health from the command line",
    long_about = "Reads the hostpulse dashboard API: fleet overview, per-host\n\
        details, and metric history. `watch` keeps polling and reprints\n\
        the overview on every update.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "HOSTPULSE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Dashboard API base URL (overrides profile)
    #[arg(long, short = 'u', env = "HOSTPULSE_URL", global = true)]
    pub url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOSTPULSE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, env = "HOSTPULSE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List monitored hosts with a fleet summary
    #[command(alias = "ls")]
    Hosts(HostsArgs),

    /// Show details and top processes for one host
    Host(HostArgs),

    /// Print the history of one metric for a host
    #[command(alias = "m")]
    Metrics(MetricsArgs),

    /// Poll the overview and reprint it on every update
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Hosts ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HostsArgs {
    /// Only show hosts with this status
    #[arg(long, short = 's')]
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    Online,
    Warning,
    Offline,
}

#[derive(Debug, Args)]
pub struct HostArgs {
    /// Host ID as listed by `hostpulse hosts`
    pub host_id: String,
}

// ── Metrics ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Host ID
    pub host_id: String,

    /// Metric name, e.g. cpu_usage_percent or net_download_bytes_sec
    #[arg(default_value = "cpu_usage_percent")]
    pub metric: String,

    /// History window (e.g. 1h, 30m)
    #[arg(long, short = 'r')]
    pub range: Option<String>,

    /// Bucket size (e.g. 30s, 5m)
    #[arg(long, short = 'a')]
    pub aggregate: Option<String>,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll period in seconds (defaults to the profile's overview interval)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the resolved configuration
    Show,

    /// Create or extend the config file interactively
    Init,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
