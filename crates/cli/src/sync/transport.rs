// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! API client abstraction for delivering requests.
//!
//! Provides a trait-based client layer that enables:
//! - Real HTTP delivery for production
//! - Mock clients for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use cq_core::{CanonicalRequest, Method};
use serde_json::Value;
use url::Url;

use crate::config;

/// Error type for API delivery.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("request failed: {0}")]
    Request(String),

    /// No response within the request's timeout.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for API delivery.
pub type ApiResult<T> = Result<T, ApiError>;

/// A successful API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        ApiResponse {
            status: 200,
            body: None,
        }
    }
}

/// Delivers canonical requests to the API.
///
/// Only 2xx responses are `Ok`; everything else is an [`ApiError`].
pub trait ApiClient: Send + Sync {
    fn send<'a>(
        &'a self,
        request: &'a CanonicalRequest,
    ) -> Pin<Box<dyn Future<Output = ApiResult<ApiResponse>> + Send + 'a>>;
}

/// HTTP client backed by reqwest.
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: Url,
    default_timeout: Duration,
}

impl HttpApiClient {
    pub fn new(base_url: &str, default_timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let base_url =
            config::base_url(base_url).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        Ok(HttpApiClient {
            client,
            base_url,
            default_timeout,
        })
    }

    /// Resolves a stored url against the base url. Absolute http(s) urls
    /// pass through.
    pub fn resolve_url(&self, url: &str) -> ApiResult<Url> {
        let invalid = |reason: String| ApiError::InvalidRequest(format!("url '{url}': {reason}"));
        let resolved = match Url::parse(url.trim()) {
            Ok(absolute) => absolute,
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(url.trim().trim_start_matches('/'))
                .map_err(|e| invalid(e.to_string()))?,
            Err(e) => return Err(invalid(e.to_string())),
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", resolved.scheme())));
        }
        Ok(resolved)
    }

    fn timeout_for(&self, request: &CanonicalRequest) -> Duration {
        request
            .timeout
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout)
    }

    async fn send_inner(&self, request: &CanonicalRequest) -> ApiResult<ApiResponse> {
        let url = self.resolve_url(&request.url)?;
        let timeout = self.timeout_for(request);

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), url.clone())
            .timeout(timeout);

        if let Some(headers) = &request.headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), header_value(value));
            }
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(timeout.as_millis() as u64)
            } else if e.is_builder() {
                ApiError::InvalidRequest(e.to_string())
            } else {
                ApiError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        };

        tracing::debug!(
            method = %request.method,
            url = %url,
            status = status.as_u16(),
            "request delivered"
        );
        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}

impl ApiClient for HttpApiClient {
    fn send<'a>(
        &'a self,
        request: &'a CanonicalRequest,
    ) -> Pin<Box<dyn Future<Output = ApiResult<ApiResponse>> + Send + 'a>> {
        Box::pin(self.send_inner(request))
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Header values are stored as JSON. Strings go out as-is, anything else as
/// its JSON text.
pub(crate) fn header_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
