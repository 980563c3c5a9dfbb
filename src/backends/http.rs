//! HTTPS transport backed by `reqwest`.
//!
//! Sends one GET per call with separate connect and read timeouts. The
//! response is owned by [`ReqwestTransport::get`] and dropped before it
//! returns, which releases the connection on every path.

use crate::core::{HttpResponse, HttpTransport, LookupError, LookupRequest};

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use tracing::{debug, warn};

/// Default connect and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Timeout for establishing the connection.
    pub connect_timeout: Duration,

    /// Timeout for each read from the connection.
    pub read_timeout: Duration,

    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl TransportConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets both the connect and the read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// The product user agent, `vtlookup/<version>`.
pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// `reqwest`-based [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Builds the underlying HTTP client.
    pub fn new(config: TransportConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                LookupError::configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Returns the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn map_error(&self, e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            let after = if e.is_connect() {
                self.config.connect_timeout
            } else {
                self.config.read_timeout
            };
            LookupError::Timeout { after }
        } else {
            LookupError::connection_failed(e.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: &LookupRequest<'_>) -> Result<HttpResponse, LookupError> {
        let mut api_key = HeaderValue::from_str(request.api_key.expose_secret()).map_err(|_| {
            LookupError::configuration("API key contains characters not allowed in a header")
        })?;
        api_key.set_sensitive(true);

        let response = self
            .client
            .get(&request.url)
            .header("x-apikey", api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        let reason = status.canonical_reason().map(str::to_string);
        debug!(url = %request.url, status = status.as_u16(), "Response received");

        if status != StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => Some(body),
                Err(e) => {
                    warn!(status = status.as_u16(), error = %e, "Failed to read error body");
                    None
                }
            };
            return Ok(HttpResponse {
                status: status.as_u16(),
                reason,
                body,
            });
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            body: Some(body),
        })
    }
}
