//! Strict external result schema
//!
//! The external service is untrusted: malformed shapes are rejected
//! immediately after the boundary call, never guessed at. Unknown
//! fields are a schema violation (`deny_unknown_fields`).

use crate::domain::BoundaryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of work assigned by the external optimizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Assignment {
    /// Workload units assigned
    pub units: u32,
    /// Scheduling cycle label (e.g. a day), if the optimizer reported one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
}

/// One token-keyed record of the external result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalRecord {
    /// Token the record refers to; must have been issued by the vault
    /// for the corresponding request
    pub id: String,
    /// Assignments produced by the optimizer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<Assignment>,
    /// Derived score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Derived recommendation label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Natural-language rationale, passed through verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Full external result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalResult {
    /// Token-keyed records, in the order the external service produced them
    pub records: Vec<ExternalRecord>,
}

/// Validate a raw boundary response against the result schema
///
/// # Errors
///
/// Returns [`BoundaryError::Malformed`] when the value does not match
/// the schema exactly.
pub fn parse_external_result(value: Value) -> Result<ExternalResult, BoundaryError> {
    serde_json::from_value(value).map_err(|e| BoundaryError::Malformed(e.to_string()))
}
