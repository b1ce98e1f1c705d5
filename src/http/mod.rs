//! HTTP client setup, one-shot authentication, and request transport.
mod auth;
mod client;
mod transport;

#[cfg(test)]
mod tests;

pub use auth::{SIGNIN_PATH, authenticate, parse_session, probe_host};
pub use client::build_client;
pub use transport::{
    InboundResponse, OutboundRequest, ReqwestTransport, Transport, TransportError,
    TransportErrorKind,
};

/// Content type sent with every replayed request.
pub const CONTENT_TYPE_JSON: &str = "application/json";
