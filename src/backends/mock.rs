//! Mock transport for testing.
//!
//! Serves canned responses without touching the network and records every
//! request it receives, so tests can assert on URLs, credentials and the
//! number of calls made.

use crate::core::{HttpResponse, HttpTransport, LookupError, LookupRequest};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A request as seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Requested URL.
    pub url: String,
    /// The credential that was sent.
    pub api_key: String,
}

/// What the mock answers with.
#[derive(Debug, Clone)]
enum MockReply {
    Response(HttpResponse),
    Timeout,
    ConnectionRefused,
}

/// A configurable mock transport.
///
/// # Examples
///
/// ```rust
/// use vtlookup::backends::MockTransport;
///
/// // Unknown to the service
/// let transport = MockTransport::not_found();
///
/// // A specific body for one URL, 404 for everything else
/// let transport = MockTransport::not_found()
///     .with_response("https://www.virustotal.com/api/v3/files/abc", 200, "{}");
/// ```
#[derive(Debug)]
pub struct MockTransport {
    /// Replies keyed by URL.
    replies: Mutex<HashMap<String, MockReply>>,
    /// Reply for URLs not in the map.
    default_reply: MockReply,
    /// Every request received, in order.
    requests: Mutex<Vec<RecordedRequest>>,
    /// Counter for calls.
    call_count: AtomicU64,
}

impl MockTransport {
    fn with_default(default_reply: MockReply) -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            default_reply,
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU64::new(0),
        }
    }

    /// Answers every request with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self::with_default(MockReply::Response(http_response(status, Some(body.into()))))
    }

    /// Answers every request with 404.
    pub fn not_found() -> Self {
        Self::new(404, r#"{"error":{"code":"NotFoundError","message":"File not found"}}"#)
    }

    /// Answers every request with the given status and an unreadable body.
    pub fn without_body(status: u16) -> Self {
        Self::with_default(MockReply::Response(http_response(status, None)))
    }

    /// Fails every request with a timeout.
    pub fn timing_out() -> Self {
        Self::with_default(MockReply::Timeout)
    }

    /// Fails every request as if the connection was refused.
    pub fn refusing() -> Self {
        Self::with_default(MockReply::ConnectionRefused)
    }

    /// Adds a reply for a specific URL.
    pub fn with_response(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.add_response(url, status, body);
        self
    }

    /// Adds a reply for a specific URL (shared-reference version).
    pub fn add_response(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.lock_replies().insert(
            url.into(),
            MockReply::Response(http_response(status, Some(body.into()))),
        );
    }

    /// Returns the number of requests received.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Returns a copy of every request received.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, HashMap<String, MockReply>> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn http_response(status: u16, body: Option<String>) -> HttpResponse {
    HttpResponse {
        status,
        reason: reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string),
        body,
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, request: &LookupRequest<'_>) -> Result<HttpResponse, LookupError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedRequest {
                url: request.url.clone(),
                api_key: request.api_key.expose_secret().to_string(),
            });

        let reply = self
            .lock_replies()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Response(response) => Ok(response),
            MockReply::Timeout => Err(LookupError::Timeout {
                after: crate::backends::http::DEFAULT_TIMEOUT,
            }),
            MockReply::ConnectionRefused => {
                Err(LookupError::connection_failed("connection refused"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn request<'a>(url: &str, api_key: &'a SecretString) -> LookupRequest<'a> {
        LookupRequest {
            url: url.to_string(),
            api_key,
        }
    }

    fn key() -> SecretString {
        SecretString::new("test-key".into())
    }

    #[tokio::test]
    async fn test_mock_default_reply() {
        let key = key();
        let transport = MockTransport::not_found();
        let response = transport.get(&request("https://x/a", &key)).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.reason.as_deref(), Some("Not Found"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_per_url_reply() {
        let key = key();
        let transport = MockTransport::not_found().with_response("https://x/known", 200, "{}");

        let known = transport.get(&request("https://x/known", &key)).await.unwrap();
        assert_eq!(known.status, 200);
        assert_eq!(known.body.as_deref(), Some("{}"));

        let unknown = transport.get(&request("https://x/other", &key)).await.unwrap();
        assert_eq!(unknown.status, 404);
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let key = key();
        let transport = MockTransport::not_found();
        transport.get(&request("https://x/a", &key)).await.unwrap();
        transport.get(&request("https://x/b", &key)).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://x/a");
        assert_eq!(requests[1].api_key, "test-key");
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let key = key();
        let err = MockTransport::timing_out()
            .get(&request("https://x/a", &key))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Timeout { .. }));

        let err = MockTransport::refusing()
            .get(&request("https://x/a", &key))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::ConnectionFailed { .. }));
    }
}
