//! External reasoning boundary
//!
//! The call to the external reasoning/optimization service: an opaque,
//! possibly-slow, possibly-failing function from token payload to
//! token-based result. Nothing reaches an implementation of
//! [`ExternalBoundary`] without having gone through the scrubber and
//! the anonymizer, and nothing coming back is trusted: responses are
//! schema-checked immediately and constraint-checked downstream.

pub mod http;
pub mod schema;

pub use http::HttpBoundary;
pub use schema::{parse_external_result, Assignment, ExternalRecord, ExternalResult};

use crate::anonymize::TokenPayload;
use crate::domain::BoundaryError;
use async_trait::async_trait;
use serde_json::Value;

/// The external reasoning/optimization dependency
///
/// Implementations return the raw response body; the pipeline performs
/// strict schema validation via [`parse_external_result`] before the
/// result reaches the hydrator.
#[async_trait]
pub trait ExternalBoundary: Send + Sync {
    /// Send a token payload to the external service
    async fn call(&self, payload: &TokenPayload) -> Result<Value, BoundaryError>;
}
