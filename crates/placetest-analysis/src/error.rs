//! Analyzer error types.
//!
//! These errors represent failures when interacting with the AI analyzer.
//! Any of them sends the fallback chain to the deterministic scorer; the
//! classification exists so callers can log and retry sensibly.

use thiserror::Error;

/// Errors that can occur when interacting with an AI analyzer.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid or missing API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The model answered, but not with a usable placement record.
    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            AnalysisError::AuthenticationFailed(_) | AnalysisError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            AnalysisError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}
