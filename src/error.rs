//! Error types for the castor crate.
//!
//! Three kinds of failure exist, and they stay distinguishable: trust
//! rejections and transport errors abort the request, while protocol parse
//! problems never surface here at all — they degrade to typed response
//! variants with `None` fields.

use std::io;
use std::time::Duration;

use crate::security::engine::TrustError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can abort a request.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The assembled request URL exceeds the protocol's 1024-byte limit.
    #[error("request URL too long ({length} bytes, limit {limit})")]
    UrlTooLong { length: usize, limit: usize },

    /// The host is not usable as a TLS server name.
    #[error("invalid host name: {0}")]
    InvalidHost(String),

    /// TCP connection did not complete in time.
    #[error("connect timeout after {0:?}")]
    ConnectTimeout(Duration),

    /// Response header did not arrive in time.
    #[error("request timeout after {0:?}")]
    RequestTimeout(Duration),

    /// The server certificate was rejected by the trust engine.
    #[error("certificate rejected: {0}")]
    Trust(#[from] TrustError),

    /// The TLS handshake failed for a reason other than a trust rejection.
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] io::Error),

    /// I/O failure on the connection.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
