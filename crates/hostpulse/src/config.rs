//! CLI-side configuration: profile resolution plus `GlobalOpts` overrides.
//!
//! Precedence is flag > `HOSTPULSE_*` env > TOML file > built-in defaults.
//! Env and file are merged by `hostpulse_config`; flags (which clap also
//! fills from their own env vars) are applied here.

use std::time::Duration;

use hostpulse_config::{Config, ConfigError};
use hostpulse_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub fn load(global: &GlobalOpts) -> Result<(Config, DashboardConfig), CliError> {
    let cfg = hostpulse_config::load_config()?;
    let dashboard = resolve(&cfg, global)?;
    Ok((cfg, dashboard))
}

/// Resolve the active profile and apply flag overrides on top.
pub fn resolve(cfg: &Config, global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let mut dashboard = match hostpulse_config::resolve_profile(cfg, global.profile.as_deref()) {
        Ok(d) => d,
        Err(ConfigError::UnknownProfile { name }) => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(cfg),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(ref url) = global.url {
        dashboard.base_url = hostpulse_config::validate_base_url(url)?;
    }
    if let Some(secs) = global.timeout {
        dashboard.timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    tracing::debug!(
        base_url = %dashboard.base_url,
        timeout = ?dashboard.timeout,
        "resolved dashboard config"
    );
    Ok(dashboard)
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hostpulse_config::Profile;

    use super::*;
    use crate::cli::{ColorMode, OutputFormat};

    fn opts() -> GlobalOpts {
        GlobalOpts {
            profile: None,
            url: None,
            output: OutputFormat::Table,
            color: ColorMode::Never,
            timeout: None,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn flags_override_profile() {
        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("http://file.lan/api/dashboard"));

        let global = GlobalOpts {
            url: Some("http://flag.lan:9000/api/dashboard".into()),
            timeout: Some(4),
            ..opts()
        };
        let resolved = resolve(&cfg, &global).unwrap();
        assert_eq!(resolved.base_url, "http://flag.lan:9000/api/dashboard");
        assert_eq!(resolved.timeout, Some(Duration::from_secs(4)));
    }

    #[test]
    fn zero_timeout_flag_disables_timeout() {
        let mut cfg = Config::default();
        cfg.defaults.timeout_secs = 30;
        let global = GlobalOpts {
            timeout: Some(0),
            ..opts()
        };
        assert_eq!(resolve(&cfg, &global).unwrap().timeout, None);
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), Profile::new("http://lab/api"));
        cfg.profiles.insert("home".into(), Profile::new("http://home/api"));

        let global = GlobalOpts {
            profile: Some("prod".into()),
            ..opts()
        };
        match resolve(&cfg, &global).unwrap_err() {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "prod");
                assert_eq!(available, "home, lab");
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
    }
}
