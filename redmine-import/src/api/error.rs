//! Error types for the Redmine API client

use thiserror::Error;

/// Failures raised by [`TrackerApi`](super::TrackerApi) operations.
///
/// A lookup miss is not a failure: lookup operations return `Ok(None)` when
/// the remote side reports 404 or an empty result set.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A mandatory field was missing or unusable before any request was sent.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Connection, DNS, timeout or response-decode failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote side answered with a non-success status.
    #[error("Redmine returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },
}
