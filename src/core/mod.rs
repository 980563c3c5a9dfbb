//! Core types and traits for the vtlookup library.
//!
//! - [`types`] - `ScanSummary`, `DetectionCounts` and the request/response values
//! - [`traits`] - The `HttpTransport` seam
//! - [`error`] - Structured error types
//! - [`input`] - File input abstraction
//! - [`hasher`] - SHA-256 file hashing

pub mod error;
pub mod hasher;
pub mod input;
pub mod traits;
pub mod types;

pub use error::{ConfigError, LookupError};
pub use hasher::FileHasher;
pub use input::FileInput;
pub use traits::{ArcTransport, HttpTransport};
pub use types::{CallOutcome, DetectionCounts, HttpResponse, LookupRequest, RawResponse, ScanSummary};
