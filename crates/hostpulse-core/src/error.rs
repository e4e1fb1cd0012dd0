// ── Core error types ──
//
// `RequestError` is the only failure a view ever sees: a status (when the
// server answered) and a displayable message. `CoreError` covers the
// setup failures around it.

use thiserror::Error;

/// A failed dashboard request, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    /// HTTP status, if the server produced a response.
    pub status: Option<u16>,
    pub message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Raised by the host detail cycle before any request is issued.
    pub fn missing_host_id() -> Self {
        Self::new("Host ID is missing.")
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl From<hostpulse_api::Error> for RequestError {
    fn from(err: hostpulse_api::Error) -> Self {
        match err {
            hostpulse_api::Error::Status { status, message } => Self {
                status: Some(status),
                message,
            },
            other => Self {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Polling interval must be greater than zero")]
    InvalidInterval,

    #[error("Cannot build dashboard client for {url}: {source}")]
    Client {
        url: String,
        #[source]
        source: hostpulse_api::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_keeps_server_message() {
        let err: RequestError = hostpulse_api::Error::Status {
            status: 500,
            message: "disk collector crashed".into(),
        }
        .into();
        assert_eq!(err.status, Some(500));
        assert_eq!(err.to_string(), "disk collector crashed");
    }

    #[test]
    fn decode_error_has_no_status() {
        let err: RequestError = hostpulse_api::Error::Deserialization {
            message: "EOF while parsing".into(),
            body: String::new(),
        }
        .into();
        assert_eq!(err.status, None);
        assert!(err.message.contains("EOF while parsing"));
    }

    #[test]
    fn missing_host_id_message() {
        assert_eq!(RequestError::missing_host_id().to_string(), "Host ID is missing.");
    }
}
