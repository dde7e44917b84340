//! HTTP transport port

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use harbor_domain::{HttpMethod, ResponseSpec};
use thiserror::Error;

/// A fully resolved request, ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL, or a same-origin relative path
    pub url: String,
    /// Headers in send order
    pub headers: Vec<(String, String)>,
    /// Serialized body
    pub body: Option<Vec<u8>>,
    /// Upper bound for the whole exchange
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Failures where no HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The URL could not be parsed or is not usable by this transport.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The exchange did not finish in time.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Anything else below HTTP (TLS, body read, ...).
    #[error("{0}")]
    Other(String),
}

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ResponseSpec, TransportError>> + Send + 'a>>;

/// Port for putting one request on the wire.
///
/// Implementations do no retrying and no auth handling; a non-2xx status is a
/// successful send.
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no HTTP response was received.
    fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}
