//! # vtlookup
//!
//! SHA-256 file reputation lookups against the VirusTotal v3 API.
//!
//! ## Overview
//!
//! Given a file and an optional API key, vtlookup:
//!
//! - Hashes the file with SHA-256
//! - Builds the public report URI for that digest
//! - Asks `api/v3/files/{sha256}` whether the file has been analysed
//! - Counts the engine verdicts and picks up the suggested threat label
//!
//! Without an API key nothing is sent over the network; the summary still
//! carries the report URI so a user can look the file up by hand. A digest
//! the service has never seen is not an error and yields zero counts.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vtlookup::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = VirusTotalConfig::new().with_api_key(std::env::var("VT_APIKEY")?);
//!     let client = VirusTotalClient::new(config)?;
//!
//!     let summary = client.scan(&FileInput::from_path("attachment.pdf")).await?;
//!     println!("{}", summary.lookup_uri);
//!     if let Some(counts) = summary.counts {
//!         println!("{} engines flagged this file", counts);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Core**: Fundamental types, the transport trait, hashing and errors
//! - **Backends**: The VirusTotal client and its HTTP transports
//! - **Config**: YAML configuration and credential resolution
//! - **Audit**: Structured lookup events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod backends;
pub mod config;
pub mod core;

// Re-export commonly used types at the crate root
pub use crate::core::{
    CallOutcome, ConfigError, DetectionCounts, FileHasher, FileInput, HttpTransport, LookupError,
    RawResponse, ScanSummary,
};

pub use crate::backends::virustotal::{
    parse_file_report, FileReport, VirusTotalClient, VirusTotalConfig, DEFAULT_ENDPOINT,
    PRIVACY_POLICY_URI,
};
pub use crate::config::Config;

/// Prelude module for convenient imports.
///
/// ```rust
/// use vtlookup::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backends::virustotal::{VirusTotalClient, VirusTotalConfig};
    pub use crate::config::Config;
    pub use crate::core::{
        CallOutcome, DetectionCounts, FileInput, LookupError, RawResponse, ScanSummary,
    };
}
