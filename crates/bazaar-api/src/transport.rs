use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::errors::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One outbound call. The body, when present, is already in the wire key
/// convention by the time it reaches a transport.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
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

#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

/// Transport-level failure. The variants distinguish "request was sent, no
/// response came back" from "a response arrived but was unusable"; retry
/// eligibility hangs on that distinction.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("request timed out")]
    Timeout,
    #[error("malformed response body: {0}")]
    MalformedBody(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// True when no response was received at all.
    pub fn is_no_response(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_) | Self::Timeout)
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        if err.is_no_response() {
            AppError::network(err.to_string())
        } else {
            AppError::new(err.to_string())
        }
    }
}

/// The abstract "perform request" capability everything above composes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Session credentials handed to a transport at construction. Explicitly
/// passed, never read from process-wide mutable state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionContext {
    bearer_token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self { bearer_token: None }
    }

    pub fn with_bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }
}

/// reqwest-backed [`Transport`]. The only type in the workspace that
/// touches HTTP; request timeouts live here, not in the retry layer.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, session: SessionContext) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        session: SessionContext,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            session,
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        tracing::debug!(method = request.method.as_str(), path = %request.path, "performing request");
        let mut builder = self
            .client
            .request(request.method.into(), self.url_for(&request.path));
        if let Some(token) = self.session.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify_reqwest_error)?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| TransportError::MalformedBody(e.to_string()))?
        };

        Ok(TransportResponse { status, body })
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() || err.is_request() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::ConnectionFailed(err.to_string())
    }
}
