//! Shared configuration for the hostpulse CLI and TUI.
//!
//! TOML profiles merged with `HOSTPULSE_*` environment overrides, and
//! translation to `hostpulse_core::DashboardConfig`. The CLI layers its
//! own flags on top of [`resolve_profile`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hostpulse_core::DashboardConfig;
use hostpulse_core::config::{
    DEFAULT_DETAIL_INTERVAL, DEFAULT_METRIC_AGGREGATE, DEFAULT_METRIC_RANGE,
    DEFAULT_OVERVIEW_INTERVAL,
};

/// Base URL used for the implicit `default` profile.
pub use hostpulse_core::config::DEFAULT_BASE_URL;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named monitoring services.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout; 0 disables it.
    #[serde(default)]
    pub timeout_secs: u64,

    #[serde(default = "default_overview_interval")]
    pub overview_interval_secs: u64,

    #[serde(default = "default_detail_interval")]
    pub detail_interval_secs: u64,

    #[serde(default = "default_metric_range")]
    pub metric_range: String,

    #[serde(default = "default_metric_aggregate")]
    pub metric_aggregate: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout_secs: 0,
            overview_interval_secs: default_overview_interval(),
            detail_interval_secs: default_detail_interval(),
            metric_range: default_metric_range(),
            metric_aggregate: default_metric_aggregate(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_overview_interval() -> u64 {
    DEFAULT_OVERVIEW_INTERVAL.as_secs()
}
fn default_detail_interval() -> u64 {
    DEFAULT_DETAIL_INTERVAL.as_secs()
}
fn default_metric_range() -> String {
    DEFAULT_METRIC_RANGE.into()
}
fn default_metric_aggregate() -> String {
    DEFAULT_METRIC_AGGREGATE.into()
}

/// A named monitoring service. Unset fields fall back to `[defaults]`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Dashboard API root (e.g., "http://monitor.lan:8080/api/dashboard").
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_interval_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_range: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_aggregate: Option<String>,
}

impl Profile {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "hostpulse", "hostpulse").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hostpulse");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file contributes nothing.
///
/// `HOSTPULSE_DEFAULTS__TIMEOUT_SECS=5` overrides `defaults.timeout_secs`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOSTPULSE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Name of the profile that `name` (or the config default) selects.
pub fn active_profile_name<'a>(cfg: &'a Config, name: Option<&'a str>) -> &'a str {
    name.or(cfg.default_profile.as_deref()).unwrap_or("default")
}

/// Build a `DashboardConfig` for `name`, or for the default profile.
///
/// An explicitly named profile must exist. When the default profile is
/// absent the built-in base URL is used with `[defaults]` applied.
pub fn resolve_profile(cfg: &Config, name: Option<&str>) -> Result<DashboardConfig, ConfigError> {
    let profile_name = active_profile_name(cfg, name);
    let profile = match cfg.profiles.get(profile_name) {
        Some(p) => p.clone(),
        None if name.is_some() => {
            return Err(ConfigError::UnknownProfile {
                name: profile_name.into(),
            });
        }
        None => Profile::new(DEFAULT_BASE_URL),
    };

    let base_url = validate_base_url(&profile.base_url)?;
    let d = &cfg.defaults;

    let timeout_secs = profile.timeout_secs.unwrap_or(d.timeout_secs);
    let overview = profile.overview_interval_secs.unwrap_or(d.overview_interval_secs);
    let detail = profile.detail_interval_secs.unwrap_or(d.detail_interval_secs);

    Ok(DashboardConfig {
        base_url,
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        overview_interval: interval("overview_interval_secs", overview)?,
        detail_interval: interval("detail_interval_secs", detail)?,
        metric_range: profile.metric_range.unwrap_or_else(|| d.metric_range.clone()),
        metric_aggregate: profile
            .metric_aggregate
            .unwrap_or_else(|| d.metric_aggregate.clone()),
    })
}

/// Check that `raw` is an absolute http(s) URL.
pub fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }
    Ok(raw.to_owned())
}

fn interval(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be at least 1 second".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}
