//! Domain error types
//!
//! The error taxonomy distinguishes locally recoverable conditions
//! (an unknown token drops one record), fatal invariant violations
//! (a vault collision aborts the request) and retryable boundary
//! failures (surfaced to the caller; the pipeline never retries
//! internally). Errors don't expose third-party types.

use thiserror::Error;

/// Main Veil error type
#[derive(Debug, Error)]
pub enum VeilError {
    /// The external result referenced a token this vault never issued.
    /// Recovered locally by dropping the offending record; surfaced as
    /// an error only when a caller resolves a single token directly.
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Two real IDs mapped to one token. This indicates a bug in token
    /// minting, not bad external input; the request must abort.
    #[error("Vault collision: token {token} already maps to {existing}, refused {incoming}")]
    VaultCollision {
        token: String,
        existing: String,
        incoming: String,
    },

    /// External boundary failures (retryable by the caller)
    #[error("External boundary error: {0}")]
    Boundary(#[from] BoundaryError),

    /// A sensitive value survived anonymization; the request fails
    /// closed rather than externalizing the payload.
    #[error("Leak check failed: {0}")]
    LeakDetected(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Audit logging errors
    #[error("Audit error: {0}")]
    Audit(String),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notification(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// External boundary failure modes
///
/// The boundary call is opaque, possibly slow and possibly failing. A
/// timeout is a distinct failure mode from a malformed response; both
/// are retryable by the caller.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The call exceeded the configured deadline
    #[error("Boundary call timed out after {0}")]
    Timeout(String),

    /// The response did not match the expected result schema
    #[error("Malformed boundary response: {0}")]
    Malformed(String),

    /// The external service rejected the call due to rate limiting (429)
    #[error("Rate limited by external service, retry after: {0}")]
    RateLimited(String),

    /// Upstream error status
    #[error("External service error: {status} - {message}")]
    Upstream { status: u16, message: String },

    /// Failed to reach the external service
    #[error("Failed to connect to external service: {0}")]
    Connection(String),
}

impl BoundaryError {
    /// Whether the caller may reasonably retry the request
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited(_) | Self::Connection(_) => true,
            Self::Upstream { status, .. } => *status >= 500,
            Self::Malformed(_) => false,
        }
    }
}

impl From<std::io::Error> for VeilError {
    fn from(err: std::io::Error) -> Self {
        VeilError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VeilError {
    fn from(err: serde_json::Error) -> Self {
        VeilError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for VeilError {
    fn from(err: toml::de::Error) -> Self {
        VeilError::Configuration(format!("TOML parse error: {err}"))
    }
}
