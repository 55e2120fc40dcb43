//! HTTP transport for RDS API calls
//!
//! The resource hierarchy never talks to the network directly. It hands an
//! [`HttpRequest`] to a [`Transport`] and gets back the status plus the
//! decoded JSON body. [`ReqwestTransport`] is the production transport;
//! tests inject their own.

use crate::error::{RdsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("rds-sdk/", env!("CARGO_PKG_VERSION"));

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and drops control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// A request handed to a [`Transport`]
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// What a [`Transport`] returns: status and the JSON-decoded body
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
}

impl RawResponse {
    /// Whether the status is 2xx
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A successful response with a typed body
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse<T> {
    pub status: u16,
    pub status_text: String,
    pub parsed_body: T,
}

impl<T> HttpResponse<T> {
    pub fn into_body(self) -> T {
        self.parsed_body
    }
}

/// Fetch-like capability the resource hierarchy is built on
///
/// Implementations fail with [`RdsError::Transport`] when no response was
/// received and [`RdsError::Decode`] when the body is not JSON. They do not
/// interpret the status; that is left to [`request`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| RdsError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RdsError::Transport(format!("failed to send request: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RdsError::Transport(format!("failed to read response body: {}", e)))?;

        // decoded before the status is looked at: a non-JSON body is a
        // decode error even on a non-2xx response
        let body = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                "Non-JSON response from {}: {} - {}",
                request.url,
                status,
                sanitize_for_log(&text)
            );
            RdsError::Decode(e.to_string())
        })?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

/// Send `request` and decode a 2xx body as `T`
///
/// A non-2xx status fails with [`RdsError::HttpStatus`] carrying the status
/// text; a body that does not match `T` fails with [`RdsError::Decode`].
pub async fn request<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: HttpRequest,
) -> Result<HttpResponse<T>> {
    let url = request.url.clone();
    let raw = transport.send(request).await?;

    if !raw.ok() {
        // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
        tracing::error!(
            "API error: {} {} - {}",
            raw.status,
            url,
            sanitize_for_log(&raw.body.to_string())
        );
        return Err(RdsError::HttpStatus {
            status: raw.status,
            status_text: raw.status_text,
        });
    }

    let parsed_body = serde_json::from_value(raw.body)?;

    Ok(HttpResponse {
        status: raw.status,
        status_text: raw.status_text,
        parsed_body,
    })
}

/// Make a typed GET request
pub async fn get<T: DeserializeOwned>(transport: &dyn Transport, url: &str) -> Result<HttpResponse<T>> {
    request(transport, HttpRequest::get(url)).await
}

/// Make a typed POST request with a JSON body
pub async fn post<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
    body: Value,
) -> Result<HttpResponse<T>> {
    request(transport, HttpRequest::post(url, body)).await
}

/// Format an RDS error for display
/// Security: Sanitizes error messages to avoid leaking API details
pub fn format_rds_error(error: &RdsError) -> String {
    match error {
        RdsError::HttpStatus { status: 401, .. } | RdsError::HttpStatus { status: 403, .. } => {
            "Access denied by the RDS API.".to_string()
        }
        RdsError::HttpStatus { status: 404, .. } => {
            "Resource not found. Check the catalog and data product IDs.".to_string()
        }
        RdsError::HttpStatus { status: 400, .. } => {
            "Invalid request. Check your query parameters.".to_string()
        }
        RdsError::HttpStatus { status, .. } if *status >= 500 => {
            "RDS service temporarily unavailable. Please try again.".to_string()
        }
        RdsError::Transport(_) => {
            "Request failed. Check your network connection and the API url.".to_string()
        }
        other => {
            let message = other.to_string();
            let sanitized = message
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .take(120)
                .collect::<String>();

            if sanitized.len() < message.len() {
                format!("{}...", sanitized)
            } else {
                sanitized
            }
        }
    }
}
