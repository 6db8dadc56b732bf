//! HTTP client for the account and optimization backends
//!
//! Wraps `reqwest::Client` behind the `HttpTransport` trait so the
//! dispatcher can be exercised without a network.

use crate::config::{Backend, BackendTarget, HttpSettings};
use crate::types::{ConfigError, GatewayError, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One backend HTTP operation derived from a tool call
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub backend: Backend,
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl BackendRequest {
    pub fn new(backend: Backend, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            backend,
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform `request` against `target`.
    ///
    /// Returns the decoded body of a 2xx response. Non-2xx responses map to
    /// `GatewayError::Backend` and network failures to `GatewayError::Transport`.
    async fn execute(&self, target: &BackendTarget, request: &BackendRequest) -> Result<Value>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: &HttpSettings) -> std::result::Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mt5-mcp/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, target: &BackendTarget, request: &BackendRequest) -> Result<Value> {
        let url = target.endpoint(&request.path);
        debug!("{} {} ({} backend)", request.method, url, target.backend);

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .header(ACCEPT, "application/json");

        if let Some(key) = &target.api_key {
            builder = builder.bearer_auth(key);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!("{} {} -> {}", request.method, url, status);

        if !status.is_success() {
            return Err(GatewayError::from_status(status.as_u16(), &text));
        }

        Ok(decode_body(text))
    }
}

/// Decode a success body; empty bodies become null and non-JSON bodies a string
fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
