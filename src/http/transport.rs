use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};

use super::CONTENT_TYPE_JSON;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request could not be built.
    Build,
    /// The per-request deadline elapsed.
    Timeout,
    /// Connection, protocol, or body read failure.
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_builder() {
            TransportErrorKind::Build
        } else {
            TransportErrorKind::Network
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Sends one request and reads its whole body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, TransportError>;
}

/// [`Transport`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    request_timeout: Option<Duration>,
}

impl ReqwestTransport {
    #[must_use]
    pub const fn new(client: Client, request_timeout: Option<Duration>) -> Self {
        Self {
            client,
            request_timeout,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<InboundResponse, TransportError> {
        let mut request_builder = self
            .client
            .request(request.method, request.url.as_str())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(request.body);
        if let Some(timeout) = self.request_timeout {
            request_builder = request_builder.timeout(timeout);
        }

        let response = request_builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(InboundResponse {
            status,
            body: body.to_vec(),
        })
    }
}
