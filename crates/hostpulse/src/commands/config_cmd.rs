//! Config subcommand handlers.

use dialoguer::{Confirm, Input};
use serde::Serialize;

use hostpulse_config::{self as config, Config, DEFAULT_BASE_URL, Profile};
use hostpulse_core::DashboardConfig;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// `config show` payload: the file as loaded plus what it resolves to.
#[derive(Serialize)]
struct ShowReport<'a> {
    path: String,
    active_profile: &'a str,
    resolved: ResolvedView<'a>,
    config: &'a Config,
}

#[derive(Serialize)]
struct ResolvedView<'a> {
    base_url: &'a str,
    timeout_secs: Option<u64>,
    overview_interval_secs: u64,
    detail_interval_secs: u64,
    metric_range: &'a str,
    metric_aggregate: &'a str,
}

impl<'a> From<&'a DashboardConfig> for ResolvedView<'a> {
    fn from(d: &'a DashboardConfig) -> Self {
        Self {
            base_url: &d.base_url,
            timeout_secs: d.timeout.map(|t| t.as_secs()),
            overview_interval_secs: d.overview_interval.as_secs(),
            detail_interval_secs: d.detail_interval.as_secs(),
            metric_range: &d.metric_range,
            metric_aggregate: &d.metric_aggregate,
        }
    }
}

fn show_text(r: &ShowReport<'_>) -> String {
    let timeout = r
        .resolved
        .timeout_secs
        .map_or_else(|| "none".into(), |s| format!("{s}s"));
    let mut profiles: Vec<&str> = r.config.profiles.keys().map(String::as_str).collect();
    profiles.sort_unstable();
    let profiles = if profiles.is_empty() {
        "(none)".to_owned()
    } else {
        profiles.join(", ")
    };

    [
        format!("Config file: {}", r.path),
        format!("Profiles:    {profiles}"),
        format!("Active:      {}", r.active_profile),
        format!("Base URL:    {}", r.resolved.base_url),
        format!("Timeout:     {timeout}"),
        format!("Overview:    every {}s", r.resolved.overview_interval_secs),
        format!("Host detail: every {}s", r.resolved.detail_interval_secs),
        format!(
            "Metrics:     range {}, aggregate {}",
            r.resolved.metric_range, r.resolved.metric_aggregate
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let (cfg, dashboard) = crate::config::load(global)?;
            let report = ShowReport {
                path: config::config_path().display().to_string(),
                active_profile: config::active_profile_name(&cfg, global.profile.as_deref()),
                resolved: ResolvedView::from(&dashboard),
                config: &cfg,
            };
            let out = output::render_single(global.output, &report, show_text, |r| r.path.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => init(global),
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path();
    let mut cfg = config::load_config_or_default();
    eprintln!("hostpulse configuration");
    eprintln!("   Config path: {}\n", path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let base_url: String = Input::new()
        .with_prompt("Dashboard API URL")
        .default(global.url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.into()))
        .validate_with(|input: &String| {
            config::validate_base_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let overview: u64 = Input::new()
        .with_prompt("Overview refresh (seconds)")
        .default(cfg.defaults.overview_interval_secs)
        .validate_with(|v: &u64| if *v == 0 { Err("must be at least 1") } else { Ok(()) })
        .interact_text()
        .map_err(prompt_err)?;

    let make_default = cfg.profiles.is_empty()
        || Confirm::new()
            .with_prompt(format!("Use '{profile_name}' by default?"))
            .default(true)
            .interact()
            .map_err(prompt_err)?;

    let mut profile = Profile::new(base_url);
    if overview != cfg.defaults.overview_interval_secs {
        profile.overview_interval_secs = Some(overview);
    }
    cfg.profiles.insert(profile_name.clone(), profile);
    if make_default {
        cfg.default_profile = Some(profile_name.clone());
    }

    let written = config::save_config(&cfg)?;
    if !global.quiet {
        eprintln!("   Saved profile '{profile_name}' to {}", written.display());
    }
    Ok(())
}
