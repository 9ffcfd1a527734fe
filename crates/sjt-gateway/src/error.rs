//! Gateway error types.

use thiserror::Error;

/// Errors that can occur when appending a row to the remote store.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The access token was rejected.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The spreadsheet or range does not exist.
    #[error("destination not found: {0}")]
    DestinationNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The HTTP client or request URL could not be built.
    #[error("invalid gateway setup: {0}")]
    Setup(String),
}

impl GatewayError {
    /// Returns `true` if resubmitting cannot help until the configuration
    /// changes.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            GatewayError::AuthenticationFailed(_)
                | GatewayError::DestinationNotFound(_)
                | GatewayError::Setup(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            GatewayError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}
