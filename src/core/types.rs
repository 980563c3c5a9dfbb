//! Core types used throughout the vtlookup library.
//!
//! This module defines the lookup result handed back to callers and the
//! transient request/response values that flow between the client and its
//! HTTP transport.

use secrecy::SecretString;
use serde::Serialize;
use std::fmt;

/// Engine verdict counts for a file known to the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DetectionCounts {
    /// Engines that could analyse the file type.
    #[serde(rename = "count")]
    pub total: u32,

    /// Engines that flagged the file as malicious.
    pub malicious: u32,
}

impl DetectionCounts {
    /// Creates counts for the given totals.
    pub fn new(total: u32, malicious: u32) -> Self {
        Self { total, malicious }
    }
}

impl fmt::Display for DetectionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.malicious, self.total)
    }
}

/// The result of a reputation lookup.
///
/// `lookup_uri` is always present so a caller can send the user to the
/// service's report page even when no lookup was performed. `counts` is
/// `None` only when no credential is configured; a hash the service has
/// never seen yields zero counts with `found` set to `false`.
///
/// Serializes to the flat record
/// `{ sha256, uri, found?, count?, malicious?, label? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Lower-case hex SHA-256 digest of the file.
    pub sha256: String,

    /// User-facing report page for this digest.
    #[serde(rename = "uri")]
    pub lookup_uri: String,

    /// Whether the service has a record for the digest, if it was asked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<bool>,

    /// Engine verdict counts, if a lookup was performed.
    #[serde(flatten)]
    pub counts: Option<DetectionCounts>,

    /// Threat label suggested by the service, if any.
    #[serde(rename = "label", skip_serializing_if = "Option::is_none")]
    pub threat_label: Option<String>,
}

impl ScanSummary {
    /// Creates a summary carrying only the digest and report URI.
    pub fn new(sha256: impl Into<String>, lookup_uri: impl Into<String>) -> Self {
        Self {
            sha256: sha256.into(),
            lookup_uri: lookup_uri.into(),
            found: None,
            counts: None,
            threat_label: None,
        }
    }

    /// Records an analysis the service returned.
    pub fn with_report(mut self, counts: DetectionCounts, label: Option<String>) -> Self {
        self.found = Some(true);
        self.counts = Some(counts);
        self.threat_label = label;
        self
    }

    /// Records that the service has never seen the digest.
    pub fn with_not_found(mut self) -> Self {
        self.found = Some(false);
        self.counts = Some(DetectionCounts::default());
        self.threat_label = None;
        self
    }

    /// Returns `true` if the service was actually consulted.
    pub fn was_looked_up(&self) -> bool {
        self.found.is_some()
    }

    /// Returns `true` if the service has a record for the digest.
    pub fn is_known(&self) -> bool {
        self.found == Some(true)
    }

    /// Total number of engines, if looked up.
    pub fn total(&self) -> Option<u32> {
        self.counts.map(|c| c.total)
    }

    /// Number of malicious verdicts, if looked up.
    pub fn malicious(&self) -> Option<u32> {
        self.counts.map(|c| c.malicious)
    }

    /// Returns `true` if at least one engine flagged the file.
    pub fn is_flagged(&self) -> bool {
        self.malicious().is_some_and(|m| m > 0)
    }
}

/// One authenticated GET against the service.
#[derive(Debug)]
pub struct LookupRequest<'a> {
    /// Absolute URL to fetch.
    pub url: String,

    /// Credential sent as the `x-apikey` header.
    pub api_key: &'a SecretString,
}

/// What the transport saw on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,

    /// Canonical reason phrase for the status, if any.
    pub reason: Option<String>,

    /// Response body. For non-200 responses this is best-effort and is
    /// `None` when it could not be read.
    pub body: Option<String>,
}

/// Status and body text returned by [`call`](crate::VirusTotalClient::call).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,

    /// The payload for 200, or `Error <status>: <reason>\n<body>` otherwise.
    pub body: String,
}

impl RawResponse {
    /// Returns `true` for HTTP 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Returns `true` for HTTP 404.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// The result of a single API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// No credential is configured; nothing was sent.
    NoCredential,

    /// The service answered.
    Response(RawResponse),
}
