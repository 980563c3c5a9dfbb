//! Core traits for the vtlookup library.
//!
//! `HttpTransport` is the seam between the lookup client and the network.
//! The production implementation is [`ReqwestTransport`](crate::backends::ReqwestTransport);
//! tests use [`MockTransport`](crate::backends::MockTransport).

use crate::core::error::LookupError;
use crate::core::types::{HttpResponse, LookupRequest};

use async_trait::async_trait;
use std::fmt::Debug;

/// Performs a single authenticated GET.
///
/// # Implementation Notes
///
/// - The request must carry `x-apikey`, `Accept: application/json` and a
///   user agent identifying the product.
/// - For a 200 response the body must be returned; failing to read it is
///   an error.
/// - For any other status the body is best-effort. A failed read is
///   logged and reported as `body: None`, never as an error.
/// - The connection must be released before returning, on every path.
/// - Implementations never retry.
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
    /// Sends the request and returns the status and body.
    ///
    /// # Errors
    ///
    /// - `Timeout` - connect or read timeout expired.
    /// - `ConnectionFailed` - the request could not be sent or the 200
    ///   body could not be read.
    async fn get(&self, request: &LookupRequest<'_>) -> Result<HttpResponse, LookupError>;
}

/// An arc-wrapped transport for shared ownership.
pub type ArcTransport = std::sync::Arc<dyn HttpTransport>;
