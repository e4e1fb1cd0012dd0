// Hand-crafted async HTTP client for the hostpulse dashboard API.
//
// Base path: /api/dashboard/ (configurable)
// Auth: none

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{HostDetail, HostSummary, MetricName, MetricSample};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/dashboard";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the dashboard endpoints.
///
/// Stateless apart from the pooled `reqwest::Client`; cheap to clone.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DashboardClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends in `/` so relative joins keep every segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase.into());
        }

        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Core request ─────────────────────────────────────────────────

    /// GET `segments` under the base URL and decode the JSON body.
    ///
    /// Non-2xx responses become [`Error::Status`] with the message taken
    /// from the body's `error` field, or `HTTP error {status}` otherwise.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(segments)?;
        if params.is_empty() {
            debug!("GET {url}");
        } else {
            debug!("GET {url} params={params:?}");
        }

        let mut request = self.http.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }
        let resp = request.send().await?;
        Self::handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;
        trace!(status = status.as_u16(), body_len = body.len(), "response received");

        if !status.is_success() {
            return Err(Self::parse_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    fn parse_error(status: u16, raw: &str) -> Error {
        let message = serde_json::from_str::<ErrorResponse>(raw)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or_else(|| format!("HTTP error {status}"));
        Error::Status { status, message }
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /hosts/overview`
    pub async fn hosts_overview(&self) -> Result<Vec<HostSummary>, Error> {
        self.fetch_json(&["hosts", "overview"], &[]).await
    }

    /// `GET /host/{id}/details`
    ///
    /// An unknown host surfaces as `Error::Status { status: 404, .. }`.
    pub async fn host_details(&self, host_id: &str) -> Result<HostDetail, Error> {
        self.fetch_json(&["host", host_id, "details"], &[]).await
    }

    /// `GET /host/{id}/metrics/{metric}?range=..&aggregate=..`
    ///
    /// `range` and `aggregate` are duration strings such as `"1h"` and
    /// `"30s"`; they are forwarded verbatim.
    pub async fn host_metric_history(
        &self,
        host_id: &str,
        metric: &MetricName,
        range: &str,
        aggregate: &str,
    ) -> Result<Vec<MetricSample>, Error> {
        let params = [("range", range.to_owned()), ("aggregate", aggregate.to_owned())];
        self.fetch_json(&["host", host_id, "metrics", metric.as_str()], &params)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> DashboardClient {
        DashboardClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let c = client("http://localhost:8080/api/dashboard");
        assert_eq!(c.base_url().as_str(), "http://localhost:8080/api/dashboard/");

        let c = client("http://localhost:8080/api/dashboard///");
        assert_eq!(c.base_url().as_str(), "http://localhost:8080/api/dashboard/");
    }

    #[test]
    fn segments_keep_base_path_and_are_encoded() {
        let c = client(DEFAULT_BASE_URL);
        let url = c.url(&["host", "rack 1/a", "details"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/dashboard/host/rack%201%2Fa/details"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        let err = DashboardClient::from_reqwest("mailto:ops@example.com", reqwest::Client::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn error_body_message_is_used() {
        let err = DashboardClient::parse_error(500, r#"{"error":"database unavailable"}"#);
        assert!(
            matches!(err, Error::Status { status: 500, ref message } if message == "database unavailable")
        );
    }

    #[test]
    fn error_falls_back_to_generic_message() {
        let err = DashboardClient::parse_error(502, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "HTTP error 502");

        let err = DashboardClient::parse_error(500, r#"{"message":"nope"}"#);
        assert_eq!(err.to_string(), "HTTP error 500");
    }
}
