//! VirusTotal reputation lookups.
//!
//! Hashes a file with SHA-256 and asks the VirusTotal v3 API whether it
//! has already been analysed. Files are never uploaded.
//!
//! # Requirements
//!
//! - A VirusTotal API key. Without one, [`VirusTotalClient::scan`] still
//!   returns the report URI but performs no network I/O.
//! - Network access to www.virustotal.com
//!
//! # API Usage
//!
//! `GET api/v3/files/{sha256}`:
//! - 200: the file object; engine verdicts are counted.
//! - 404: the hash is unknown; reported as zero detections.
//! - anything else: [`LookupError::LookupFailed`].

use crate::audit;
use crate::backends::http::{ReqwestTransport, TransportConfig};
use crate::core::{
    ArcTransport, CallOutcome, DetectionCounts, FileHasher, FileInput, LookupError,
    LookupRequest, RawResponse, ScanSummary,
};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Public VirusTotal endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.virustotal.com/";

/// VirusTotal's privacy policy, for display next to an API key setting.
pub const PRIVACY_POLICY_URI: &str =
    "https://support.virustotal.com/hc/en-us/articles/115002168385-Privacy-Policy";

/// Category reported by engines that cannot analyse the file type.
const CATEGORY_TYPE_UNSUPPORTED: &str = "type-unsupported";

/// Category reported by engines that detected the file.
const CATEGORY_MALICIOUS: &str = "malicious";

/// VirusTotal client configuration.
#[derive(Debug)]
pub struct VirusTotalConfig {
    /// API key (kept secret). `None` disables lookups.
    pub api_key: Option<SecretString>,

    /// Base URL, always ending in `/`.
    pub endpoint: String,

    /// HTTP transport settings.
    pub transport: TransportConfig,
}

impl Default for VirusTotalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            transport: TransportConfig::default(),
        }
    }
}

impl VirusTotalConfig {
    /// Creates a configuration without a credential.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. An empty or blank key leaves lookups disabled.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.trim().is_empty() {
            None
        } else {
            Some(SecretString::new(api_key.into()))
        };
        self
    }

    /// Sets the base URL. A trailing `/` is added when missing.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let mut endpoint = endpoint.into();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        self.endpoint = endpoint;
        self
    }

    /// Sets the connect and read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.with_timeout(timeout);
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.transport = self.transport.with_user_agent(user_agent);
        self
    }

    /// Returns `true` if an API key is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

/// VirusTotal lookup client.
///
/// # Example
///
/// ```rust,ignore
/// use vtlookup::backends::virustotal::{VirusTotalClient, VirusTotalConfig};
/// use vtlookup::core::FileInput;
///
/// let config = VirusTotalConfig::new().with_api_key("your-api-key");
/// let client = VirusTotalClient::new(config)?;
/// let summary = client.scan(&FileInput::from_path("invoice.pdf")).await?;
/// println!("{} -> {:?}", summary.lookup_uri, summary.counts);
/// ```
#[derive(Debug)]
pub struct VirusTotalClient {
    config: VirusTotalConfig,
    hasher: FileHasher,
    transport: ArcTransport,
}

impl VirusTotalClient {
    /// Creates a client that talks to the network through `reqwest`.
    pub fn new(config: VirusTotalConfig) -> Result<Self, LookupError> {
        let transport = ReqwestTransport::new(config.transport.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client using the given transport.
    pub fn with_transport(config: VirusTotalConfig, transport: ArcTransport) -> Self {
        Self {
            config,
            hasher: FileHasher::new(),
            transport,
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &VirusTotalConfig {
        &self.config
    }

    /// Returns the user-facing report page for a digest.
    pub fn lookup_uri(&self, sha256: &str) -> String {
        format!("{}gui/file/{}", self.config.endpoint, sha256)
    }

    /// Hashes the file and looks its digest up.
    ///
    /// The returned summary always carries the report URI. Counts are
    /// present unless no API key is configured; a digest unknown to the
    /// service yields zero counts.
    ///
    /// # Errors
    ///
    /// - `FileNotFound` / `Io` - the file could not be read.
    /// - `LookupFailed` - the service answered with neither 200 nor 404.
    /// - `MalformedResponse` - a 200 body did not match the file schema.
    /// - `Timeout` / `ConnectionFailed` - the request did not complete.
    pub async fn scan(&self, input: &FileInput) -> Result<ScanSummary, LookupError> {
        let start = Instant::now();

        let sha256 = self.hasher.hash_input_async(input).await?;
        let summary = ScanSummary::new(&sha256, self.lookup_uri(&sha256));
        info!(uri = %summary.lookup_uri, "VirusTotal lookup");
        audit::emit_lookup_started(&summary, input.filename());

        let result = self.lookup(summary).await;
        match &result {
            Ok(summary) if summary.was_looked_up() => {
                audit::emit_lookup_completed(summary, start.elapsed())
            }
            Ok(summary) => audit::emit_lookup_skipped(summary),
            Err(e) => audit::emit_lookup_failed(&sha256, e),
        }
        result
    }

    async fn lookup(&self, summary: ScanSummary) -> Result<ScanSummary, LookupError> {
        let response = match self.call(&files_path(&summary.sha256)).await? {
            CallOutcome::NoCredential => return Ok(summary),
            CallOutcome::Response(response) => response,
        };

        if response.is_not_found() {
            info!(sha256 = %summary.sha256, "Unknown to VirusTotal");
            return Ok(summary.with_not_found());
        }
        if !response.is_ok() {
            return Err(LookupError::lookup_failed(response.status, response.body));
        }

        let report = parse_file_report(&response.body)?;
        info!(
            malicious = report.counts.malicious,
            total = report.counts.total,
            label = ?report.threat_label,
            "VirusTotal analysis"
        );
        Ok(summary.with_report(report.counts, report.threat_label))
    }

    /// Performs one authenticated GET of `endpoint + api_path`.
    ///
    /// Returns [`CallOutcome::NoCredential`] without sending anything when
    /// no API key is configured. A non-200 answer is not an error here: its
    /// body becomes `Error <status>: <reason>` followed by the response body
    /// on a new line, when one could be read. Statuses without a known
    /// reason phrase render as `Error <status>`.
    pub async fn call(&self, api_path: &str) -> Result<CallOutcome, LookupError> {
        let api_key = match &self.config.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => key,
            _ => {
                debug!("No VirusTotal API key configured");
                return Ok(CallOutcome::NoCredential);
            }
        };

        let request = LookupRequest {
            url: format!("{}{}", self.config.endpoint, api_path),
            api_key,
        };
        debug!(url = %request.url, "Querying VirusTotal");

        let response = self.transport.get(&request).await?;

        if response.status != 200 {
            let mut error = format!("Error {}", response.status);
            if let Some(reason) = response.reason.filter(|r| !r.is_empty()) {
                error.push_str(": ");
                error.push_str(&reason);
            }
            if let Some(body) = response.body.filter(|b| !b.is_empty()) {
                error.push('\n');
                error.push_str(&body);
            }
            return Ok(CallOutcome::Response(RawResponse {
                status: response.status,
                body: error,
            }));
        }

        let body = response
            .body
            .ok_or_else(|| LookupError::connection_failed("response body missing"))?;
        trace!(body = %body, "VirusTotal response");

        Ok(CallOutcome::Response(RawResponse {
            status: response.status,
            body,
        }))
    }
}

fn files_path(sha256: &str) -> String {
    format!("api/v3/files/{}", sha256)
}

/// The parts of a file report that end up in a [`ScanSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// Engine verdict counts.
    pub counts: DetectionCounts,

    /// Suggested threat label, if the service has one.
    pub threat_label: Option<String>,
}

// https://developers.virustotal.com/reference/files
#[derive(Debug, Deserialize)]
struct FileObjectResponse {
    data: FileObject,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    attributes: FileAttributes,
}

#[derive(Debug, Deserialize)]
struct FileAttributes {
    #[serde(default)]
    popular_threat_classification: Option<ThreatClassification>,

    last_analysis_results: BTreeMap<String, EngineResult>,
}

#[derive(Debug, Deserialize)]
struct ThreatClassification {
    #[serde(default)]
    suggested_threat_label: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EngineResult {
    category: String,

    #[serde(default)]
    result: Option<String>,
}

/// Decodes a `GET api/v3/files/{id}` body.
///
/// Engines reporting `type-unsupported` are left out of the total; engines
/// reporting `malicious` are counted as detections.
///
/// # Errors
///
/// `MalformedResponse` if the body is not JSON or lacks `data`,
/// `data.attributes`, `last_analysis_results`, or an engine's `category`.
pub fn parse_file_report(body: &str) -> Result<FileReport, LookupError> {
    let response: FileObjectResponse = serde_json::from_str(body)?;
    let attributes = response.data.attributes;

    let mut counts = DetectionCounts::default();
    for (engine, verdict) in &attributes.last_analysis_results {
        debug!(
            engine = %engine,
            category = %verdict.category,
            result = ?verdict.result,
            "Engine verdict"
        );
        if verdict.category != CATEGORY_TYPE_UNSUPPORTED {
            counts.total += 1;
        }
        if verdict.category == CATEGORY_MALICIOUS {
            counts.malicious += 1;
        }
    }

    let threat_label = attributes
        .popular_threat_classification
        .and_then(|c| c.suggested_threat_label);

    Ok(FileReport {
        counts,
        threat_label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MockTransport;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    const REPORT: &str = r#"{
        "data": {
            "id": "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
            "type": "file",
            "attributes": {
                "popular_threat_classification": {
                    "suggested_threat_label": "trojan.emotet/heodo"
                },
                "last_analysis_results": {
                    "Alibaba": { "category": "type-unsupported", "result": null },
                    "Avast": { "category": "malicious", "result": "Win32:Trojan-gen" },
                    "BitDefender": { "category": "malicious", "result": "Trojan.GenericKD" },
                    "ClamAV": { "category": "harmless", "result": null }
                }
            }
        }
    }"#;

    fn client(api_key: &str, transport: Arc<MockTransport>) -> VirusTotalClient {
        VirusTotalClient::with_transport(VirusTotalConfig::new().with_api_key(api_key), transport)
    }

    fn file_url(sha256: &str) -> String {
        format!("{}api/v3/files/{}", DEFAULT_ENDPOINT, sha256)
    }

    #[test]
    fn test_config_builder() {
        let config = VirusTotalConfig::new()
            .with_api_key("test-key")
            .with_endpoint("http://localhost:8080")
            .with_timeout(Duration::from_secs(5));

        assert!(config.has_credential());
        assert_eq!(config.endpoint, "http://localhost:8080/");
        assert_eq!(config.transport.read_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_config_blank_key() {
        assert!(!VirusTotalConfig::new().has_credential());
        assert!(!VirusTotalConfig::new().with_api_key("").has_credential());
        assert!(!VirusTotalConfig::new().with_api_key("   ").has_credential());
    }

    #[test]
    fn test_parse_counts_and_label() {
        let report = parse_file_report(REPORT).unwrap();
        assert_eq!(report.counts, DetectionCounts::new(3, 2));
        assert_eq!(report.threat_label.as_deref(), Some("trojan.emotet/heodo"));
    }

    #[test]
    fn test_parse_without_classification() {
        let body = r#"{"data":{"attributes":{"last_analysis_results":{
            "ClamAV":{"category":"undetected"},
            "Avast":{"category":"harmless"}
        }}}}"#;
        let report = parse_file_report(body).unwrap();
        assert_eq!(report.counts, DetectionCounts::new(2, 0));
        assert_eq!(report.threat_label, None);
    }

    #[test]
    fn test_parse_classification_without_label() {
        let body = r#"{"data":{"attributes":{
            "popular_threat_classification":{"popular_threat_category":[]},
            "last_analysis_results":{}
        }}}"#;
        let report = parse_file_report(body).unwrap();
        assert_eq!(report.threat_label, None);
        assert_eq!(report.counts, DetectionCounts::default());
    }

    #[test]
    fn test_parse_missing_fields_is_malformed() {
        for body in [
            r#"{}"#,
            r#"{"data":{}}"#,
            r#"{"data":{"attributes":{}}}"#,
            r#"{"data":{"attributes":{"last_analysis_results":null}}}"#,
            r#"{"data":{"attributes":{"last_analysis_results":{"X":{}}}}}"#,
            "not json",
        ] {
            let err = parse_file_report(body).unwrap_err();
            assert!(
                matches!(err, LookupError::MalformedResponse { .. }),
                "{} -> {:?}",
                body,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_scan_without_credential() {
        let transport = Arc::new(MockTransport::not_found());
        let client = client("", transport.clone());

        let summary = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap();

        assert_eq!(summary.sha256, HELLO_WORLD_SHA256);
        assert_eq!(
            summary.lookup_uri,
            format!("https://www.virustotal.com/gui/file/{}", HELLO_WORLD_SHA256)
        );
        assert_eq!(summary.counts, None);
        assert_eq!(summary.found, None);
        assert_eq!(summary.threat_label, None);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_scan_not_found() {
        let transport = Arc::new(MockTransport::not_found());
        let client = client("test-key", transport.clone());

        let summary = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap();

        assert_eq!(summary.counts, Some(DetectionCounts::new(0, 0)));
        assert_eq!(summary.found, Some(false));
        assert_eq!(summary.threat_label, None);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, file_url(HELLO_WORLD_SHA256));
        assert_eq!(requests[0].api_key, "test-key");
    }

    #[tokio::test]
    async fn test_scan_found() {
        let transport = Arc::new(MockTransport::not_found().with_response(
            file_url(HELLO_WORLD_SHA256),
            200,
            REPORT,
        ));
        let client = client("test-key", transport);

        let summary = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap();

        assert!(summary.is_known());
        assert_eq!(summary.total(), Some(3));
        assert_eq!(summary.malicious(), Some(2));
        assert_eq!(summary.threat_label.as_deref(), Some("trojan.emotet/heodo"));
    }

    #[tokio::test]
    async fn test_scan_known_but_unsupported_everywhere() {
        let body = r#"{"data":{"attributes":{"last_analysis_results":{
            "Alibaba":{"category":"type-unsupported"}
        }}}}"#;
        let client = client("test-key", Arc::new(MockTransport::new(200, body)));

        let summary = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap();

        assert_eq!(summary.counts, Some(DetectionCounts::new(0, 0)));
        assert_eq!(summary.found, Some(true));
        assert_eq!(audit::outcome_label(&summary), "unsupported");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["found"], true);
    }

    #[tokio::test]
    async fn test_scan_malformed_report() {
        let body = r#"{"data":{"attributes":{"popular_threat_classification":null}}}"#;
        let client = client("test-key", Arc::new(MockTransport::new(200, body)));

        let err = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_scan_server_error() {
        let client = client("test-key", Arc::new(MockTransport::new(500, "backend exploded")));

        let err = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap_err();

        match err {
            LookupError::LookupFailed { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Error 500: Internal Server Error\nbackend exploded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scan_unauthorized() {
        let client = client("wrong-key", Arc::new(MockTransport::new(401, "")));

        let err = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap_err();
        assert!(err.is_authentication_failure());
        assert_eq!(err.to_string(), "lookup failed with status 401: Error 401: Unauthorized");
    }

    #[tokio::test]
    async fn test_call_unreadable_error_body() {
        let client = client("test-key", Arc::new(MockTransport::without_body(503)));

        let outcome = client.call("api/v3/files/abc").await.unwrap();
        assert_eq!(
            outcome,
            CallOutcome::Response(RawResponse {
                status: 503,
                body: "Error 503: Service Unavailable".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_call_status_without_reason_phrase() {
        let client = client("test-key", Arc::new(MockTransport::new(499, "")));

        let outcome = client.call("api/v3/files/abc").await.unwrap();
        assert_eq!(
            outcome,
            CallOutcome::Response(RawResponse {
                status: 499,
                body: "Error 499".into(),
            })
        );

        let err = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "lookup failed with status 499: Error 499");
    }

    #[tokio::test]
    async fn test_call_without_credential() {
        let transport = Arc::new(MockTransport::not_found());
        let client = client("", transport.clone());

        let outcome = client.call("api/v3/files/abc").await.unwrap();
        assert_eq!(outcome, CallOutcome::NoCredential);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_scan_transport_failure() {
        let client = client("test-key", Arc::new(MockTransport::timing_out()));

        let err = client
            .scan(&FileInput::from_bytes(b"hello world".to_vec()))
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_scan_is_repeatable() {
        let transport = Arc::new(MockTransport::new(200, REPORT));
        let client = client("test-key", transport.clone());
        let input = FileInput::from_bytes(b"same bytes".to_vec());

        let first = client.scan(&input).await.unwrap();
        let second = client.scan(&input).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_scan_missing_file() {
        let transport = Arc::new(MockTransport::not_found());
        let client = client("test-key", transport.clone());

        let err = client
            .scan(&FileInput::from_path("/definitely/not/here.bin"))
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::FileNotFound { .. }));
        assert_eq!(transport.call_count(), 0);
    }
}
