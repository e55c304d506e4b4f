use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::TrackerError;

use super::{ApiRequest, Transport};

/// Base URL of the Tracker v5 REST API.
pub const API_URL: &str = "https://www.pivotaltracker.com/services/v5";

/// Header carrying the API token on every request (`X-TrackerToken`).
pub const TOKEN_HEADER: &str = "x-trackertoken";

/// Transport talking to the real service over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport rooted at `base_url` that authenticates with `token`.
    ///
    /// No request is sent here.
    pub fn new(base_url: impl Into<String>, token: &str) -> Result<Self, TrackerError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut token_value = HeaderValue::from_str(token).map_err(|_| {
            TrackerError::Configuration("API token contains characters not allowed in a header".into())
        })?;
        token_value.set_sensitive(true);
        headers.insert(HeaderName::from_static(TOKEN_HEADER), token_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TrackerError::Configuration(format!("building HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, TrackerError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(
            "transport: {} {} query={:?}",
            request.method,
            request.path,
            request.query
        );

        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = request.body.clone() {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| request_error(&request, e.status().map(|s| s.as_u16()), e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| request_error(&request, Some(status.as_u16()), e.to_string()))?;
        tracing::debug!("transport: {} {} -> {status}", request.method, request.path);

        if !status.is_success() {
            tracing::warn!(
                "transport: {} {} returned {status}",
                request.method,
                request.path
            );
            let message = if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_owned()
            } else {
                text
            };
            return Err(request_error(&request, Some(status.as_u16()), message));
        }

        Ok(text)
    }
}

fn request_error(request: &ApiRequest, status: Option<u16>, message: String) -> TrackerError {
    TrackerError::RemoteRequest {
        method: request.method.to_string(),
        path: request.path.clone(),
        status,
        message,
    }
}
