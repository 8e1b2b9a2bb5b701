//! HTTP transport seam.
//!
//! DESIGN
//! ======
//! Everything above this module speaks in [`ApiRequest`] values and JSON
//! bodies. [`Transport`] is the single async seam between the client core and
//! the network, so tests swap in a scripted transport.
//!
//! Sessions ride on cookies (`id_token`, `access_token`, `oauth_state`). The
//! reqwest cookie store keeps them between calls; an explicit `Cookie` header
//! from configuration replaces the store for headless use.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};

use super::error::ApiError;
use crate::config::ClientConfig;

// =============================================================================
// REQUEST
// =============================================================================

/// A backend request relative to the configured base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path beginning with `/api/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), query: Vec::new(), body: None }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    /// Value of a query parameter, if present.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

// =============================================================================
// TRANSPORT TRAIT
// =============================================================================

/// Sends one request and returns the decoded JSON body.
///
/// Implementations map non-success statuses to [`ApiError`] via
/// [`ApiError::from_response`] and return `Value::Null` for empty bodies.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request cannot be sent, the backend
    /// answers with a non-success status, or the body is not JSON.
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, ApiError>;
}

// =============================================================================
// REQWEST IMPLEMENTATION
// =============================================================================

/// [`Transport`] backed by a shared `reqwest::Client`.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Build the HTTP client from typed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the cookie header is not a
    /// valid header value or the client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs));

        builder = match &config.cookie {
            Some(cookie) => {
                let mut headers = HeaderMap::new();
                let value = HeaderValue::from_str(cookie).map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
                headers.insert(COOKIE, value);
                builder.default_headers(headers)
            }
            None => builder.cookie_store(true),
        };

        let http = builder
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, ApiError> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = self.http.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(method = %request.method, path = %request.path, error = %e, "request failed");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(method = %request.method, path = %request.path, status = status.as_u16(), "backend rejected request");
            return Err(ApiError::from_response(status.as_u16(), &text));
        }

        parse_body(&text)
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn parse_body(text: &str) -> Result<serde_json::Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}
