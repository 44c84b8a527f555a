// SPDX-License-Identifier: MIT

//! Error types for the refresh core.
//!
//! Nothing here is process-fatal: every failure degrades to "keep showing
//! the last good snapshot". The host decides when repeated auth failures
//! warrant a re-authorization prompt.

/// Token renewal was rejected by the auth endpoint.
///
/// Fatal for the current cycle's sensor fetch, non-fatal for the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("refresh token expired or revoked")]
    ExpiredOrRevoked,
}

/// A data fetch against one of the upstream sources failed.
///
/// The cache for that source is left untouched; the last-attempt timestamp
/// still advances so a failing upstream is retried on the normal cadence
/// rather than every tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("upstream rejected request: {0}")]
    UpstreamRejected(String),
}

impl FetchError {
    /// Classify an upstream HTTP status: 429 is a rate limit, everything
    /// else non-2xx is a rejection.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 429 {
            FetchError::RateLimited
        } else {
            FetchError::UpstreamRejected(format!("HTTP {}: {}", status, body))
        }
    }
}

/// Either failure mode of an operation that needs a token *and* a fetch,
/// such as reloading the station directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Result type alias used throughout the fetch paths.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
