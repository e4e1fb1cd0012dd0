//! CLI error types with miette diagnostics.
//!
//! Maps API, request, and config failures into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use hostpulse_config::ConfigError;
use hostpulse_core::hostpulse_api::Error as ApiError;
use hostpulse_core::{CoreError, RequestError};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the dashboard service at {url}")]
    #[diagnostic(
        code(hostpulse::connection_failed),
        help(
            "Check that the monitoring service is running and reachable.\n\
             Override the address with --url or HOSTPULSE_URL."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(hostpulse::timeout),
        help("Increase the limit with --timeout, or pass --timeout 0 to disable it.")
    )]
    Timeout { url: String },

    // ── Server ───────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(hostpulse::not_found),
        help("Run: hostpulse {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(hostpulse::api_error), help("The dashboard service answered HTTP {status}."))]
    Api { status: u16, message: String },

    #[error("{message}")]
    #[diagnostic(code(hostpulse::request_failed))]
    Request { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hostpulse::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hostpulse::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hostpulse config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(hostpulse::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(hostpulse::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Classify a failed request. `target` names what was being fetched,
    /// `url` is where.
    pub fn from_api(err: ApiError, target: Target<'_>, url: &str) -> Self {
        if err.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        if err.is_not_found() {
            return target.not_found();
        }
        match err {
            ApiError::Status { status, message } => {
                Self::Api { status, message }
            }
            ApiError::Transport(_) => Self::ConnectionFailed {
                url: url.into(),
                source: err,
            },
            other => Self::Request {
                message: other.to_string(),
            },
        }
    }

    /// Classify a failure that has already been flattened by the core.
    pub fn from_request(err: RequestError, target: Target<'_>) -> Self {
        match err.status {
            Some(404) => target.not_found(),
            Some(status) => Self::Api {
                status,
                message: err.message,
            },
            None if err == RequestError::missing_host_id() => Self::Validation {
                field: "host_id".into(),
                reason: err.message,
            },
            None => Self::Request {
                message: err.message,
            },
        }
    }
}

/// What a request was after, for not-found reporting.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Overview,
    Host(&'a str),
    Metric { host_id: &'a str, metric: &'a str },
}

impl Target<'_> {
    fn not_found(self) -> CliError {
        let (resource_type, identifier) = match self {
            Target::Overview => ("endpoint", "hosts/overview".to_owned()),
            Target::Host(id) => ("host", id.to_owned()),
            Target::Metric { host_id, metric } => ("metric", format!("{host_id}/{metric}")),
        };
        CliError::NotFound {
            resource_type: resource_type.into(),
            identifier,
            list_command: "hosts".into(),
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Request(e) => Self::Request { message: e.message },
            CoreError::InvalidInterval => Self::Validation {
                field: "interval".into(),
                reason: "must be greater than zero".into(),
            },
            CoreError::Client { url, source } => Self::Validation {
                field: "url".into(),
                reason: format!("{url}: {source}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(CliError::Timeout { url: "x".into() }.exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::from_request(RequestError::missing_host_id(), Target::Host("")).exit_code(),
            exit_code::USAGE
        );
        let nf = CliError::from_request(
            RequestError {
                status: Some(404),
                message: "Host not found".into(),
            },
            Target::Host("db-9"),
        );
        assert_eq!(nf.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(nf.to_string(), "host 'db-9' not found");
    }

    #[test]
    fn server_message_is_kept() {
        let err = CliError::from_api(
            ApiError::Status {
                status: 500,
                message: "database unavailable".into(),
            },
            Target::Overview,
            "http://localhost:8080/api/dashboard/",
        );
        assert_eq!(err.to_string(), "database unavailable");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
