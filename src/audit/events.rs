//! Audit event emission for lookups.

use crate::core::{LookupError, ScanSummary};

use std::time::Duration;

/// Short outcome name recorded with completed lookups.
pub fn outcome_label(summary: &ScanSummary) -> &'static str {
    match (summary.found, summary.counts) {
        (None, _) | (_, None) => "not_configured",
        (Some(false), _) => "unknown",
        (Some(true), Some(counts)) if counts.malicious > 0 => "flagged",
        (Some(true), Some(counts)) if counts.total == 0 => "unsupported",
        (Some(true), Some(_)) => "clean",
    }
}

/// Emits an audit event for a lookup starting.
pub fn emit_lookup_started(summary: &ScanSummary, filename: Option<&str>) {
    tracing::info!(
        target: "vtlookup::audit",
        event_type = "lookup_started",
        sha256 = %summary.sha256,
        uri = %summary.lookup_uri,
        filename = ?filename,
        "Lookup started"
    );
}

/// Emits an audit event for a lookup skipped because no API key is set.
pub fn emit_lookup_skipped(summary: &ScanSummary) {
    tracing::info!(
        target: "vtlookup::audit",
        event_type = "lookup_skipped",
        sha256 = %summary.sha256,
        outcome = outcome_label(summary),
        "Lookup skipped, no API key configured"
    );
}

/// Emits an audit event for a completed lookup.
pub fn emit_lookup_completed(summary: &ScanSummary, elapsed: Duration) {
    tracing::info!(
        target: "vtlookup::audit",
        event_type = "lookup_completed",
        sha256 = %summary.sha256,
        outcome = outcome_label(summary),
        found = ?summary.found,
        total = ?summary.total(),
        malicious = ?summary.malicious(),
        label = ?summary.threat_label,
        duration_ms = elapsed.as_millis() as u64,
        "Lookup completed"
    );
}

/// Emits an audit event for a failed lookup.
pub fn emit_lookup_failed(sha256: &str, error: &LookupError) {
    tracing::warn!(
        target: "vtlookup::audit",
        event_type = "lookup_failed",
        sha256 = %sha256,
        status = ?error.status(),
        transport = error.is_transport(),
        error = %error,
        "Lookup failed"
    );
}
