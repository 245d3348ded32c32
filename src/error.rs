//! Failure taxonomy shared by all backend operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by backend operations.
///
/// Upstream failures are passed through unchanged and never retried. A
/// failed logo download is the one absorbed failure: it degrades to the
/// empty-logo sentinel inside the app-info operation and never reaches
/// callers as an error.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Upstream answered with a non-2xx, non-404 status. Carries the
    /// status and raw body for diagnostic passthrough.
    #[error("upstream rejected the request with status {status}: {body}")]
    UpstreamRejected { status: StatusCode, body: String },

    /// The entity does not exist upstream (404), or a derived lookup came
    /// up empty after a successful call.
    #[error("not found: {0}")]
    NotFound(String),

    /// A successful response whose body lacks data this system requires.
    /// Distinct from [`BackendError::UpstreamRejected`]: the HTTP exchange
    /// worked, the contract drifted.
    #[error("upstream payload is missing required data: {0}")]
    MalformedUpstreamData(#[from] serde_json::Error),

    /// The request never produced an upstream status (connect, TLS, or
    /// body-read failure).
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl BackendError {
    /// The status an embedding HTTP server should answer with: rejected
    /// upstream calls keep the upstream status, missing entities map to
    /// 404, contract drift to 500, transport failures to 502.
    pub fn status(&self) -> StatusCode {
        match self {
            BackendError::UpstreamRejected { status, .. } => *status,
            BackendError::NotFound(_) => StatusCode::NOT_FOUND,
            BackendError::MalformedUpstreamData(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BackendError::Request(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
