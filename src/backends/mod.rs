//! Lookup backends and HTTP transports.
//!
//! - [`virustotal`] - The VirusTotal v3 file lookup client
//! - [`http`] - `reqwest` transport used in production
//! - [`mock`] - A mock transport for testing

pub mod http;
pub mod mock;
pub mod virustotal;

pub use http::{ReqwestTransport, TransportConfig};
pub use mock::MockTransport;
pub use virustotal::{VirusTotalClient, VirusTotalConfig};
