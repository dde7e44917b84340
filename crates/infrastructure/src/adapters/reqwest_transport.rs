//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It puts exactly one
//! request on the wire; auth, replay and timeouts above the socket belong to
//! the request executor.

use std::collections::HashMap;
use std::time::Instant;

use harbor_application::ports::{HttpTransport, TransportError, TransportFuture, TransportRequest};
use harbor_domain::{HttpMethod, ResponseSpec};
use reqwest::{Client, Method, Url};
use tracing::trace;

const MAX_REDIRECTS: usize = 10;

/// HTTP transport backed by `reqwest::Client`.
///
/// Requests must carry absolute URLs. A same-origin relative path has no
/// origin to resolve against outside a browser and is rejected as
/// [`TransportError::InvalidUrl`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with default settings.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "harbor/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(concat!("harbor/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a transport around a preconfigured reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn parse_url(url: &str) -> Result<Url, TransportError> {
        Url::parse(url).map_err(|e| match e {
            url::ParseError::RelativeUrlWithoutBase => {
                TransportError::InvalidUrl(format!("{url} has no origin; configure an API URL"))
            }
            other => TransportError::InvalidUrl(format!("{other}: {url}")),
        })
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();
            return TransportError::ConnectionFailed(format!("{host}: {error}"));
        }

        if error.is_redirect() {
            return TransportError::Other(format!("more than {MAX_REDIRECTS} redirects"));
        }

        TransportError::Other(error.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let url = Self::parse_url(&request.url)?;
            let timeout_ms = request
                .timeout
                .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));

            let start = Instant::now();
            let mut builder = self
                .client
                .request(Self::to_reqwest_method(request.method), url);
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|e| Self::map_error(&e, timeout_ms))?;

            let status = response.status().as_u16();
            let headers: HashMap<String, String> = response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
                .collect();

            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Other(format!("Failed to read body: {e}")))?
                .to_vec();

            let duration = start.elapsed();
            trace!(status, bytes = body.len(), ?duration, "response received");
            Ok(ResponseSpec::new(status, headers, body, duration))
        })
    }
}
