//! The single error kind raised by the retrieval pipeline.

use std::error::Error as StdError;

use thiserror::Error;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Any failure talking to the remote video platform: network, quota, HTTP
/// status, or a payload we could not make sense of.
///
/// Callers have one recovery path (retry the whole run or give up), so the
/// cause is kept as text plus an optional source instead of separate variants.
#[derive(Debug, Error)]
#[error("{endpoint} request failed: {message}")]
pub struct UpstreamError {
    endpoint: &'static str,
    message: String,
    status: Option<u16>,
    #[source]
    source: Option<BoxedSource>,
}

impl UpstreamError {
    /// Connection, DNS, TLS or timeout failure.
    pub fn transport(endpoint: &'static str, source: impl Into<BoxedSource>) -> Self {
        let source = source.into();
        Self {
            endpoint,
            message: source.to_string(),
            status: None,
            source: Some(source),
        }
    }

    /// The platform answered with a non-success status code.
    pub fn status(endpoint: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            message: format!("HTTP {status}: {}", message.into()),
            status: Some(status),
            source: None,
        }
    }

    /// The response decoded, but a field we rely on is missing or invalid.
    pub fn malformed(endpoint: &'static str, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            message: format!("malformed payload: {}", message.into()),
            status: None,
            source: None,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status
    }
}
