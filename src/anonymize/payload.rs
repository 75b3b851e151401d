//! Token payload model
//!
//! The only structure permitted to cross the external boundary. Every
//! field is a token, a categorical value, or a bucketed numeric; no raw
//! sensitive value may appear here.

use crate::anonymize::bucket::MonetaryTier;
use crate::domain::{AnonymizedId, AvailabilityWindow, EntityKind, Result};
use serde::{Deserialize, Serialize};

/// One de-identified entity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Opaque anonymized identifier
    pub id: AnonymizedId,
    /// Entity kind
    pub kind: EntityKind,
    /// Role (categorical, verbatim)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Sector/region label (categorical, verbatim)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Condition tags (categorical, verbatim)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub condition_tags: Vec<String>,
    /// Availability windows (categorical, coarse)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub availability: Vec<AvailabilityWindow>,
    /// Bucketed monetary magnitude; never a raw figure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monetary_tier: Option<MonetaryTier>,
    /// Cross-references, translated element-wise to tokens
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<AnonymizedId>,
    /// Scrubbed free-text notes; omitted when scrubbing could not be
    /// confirmed (fail-closed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Batch of token records crossing the external boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// De-identified records, in input order
    pub records: Vec<TokenRecord>,
}

impl TokenPayload {
    /// Number of records in the payload
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the payload carries no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize the payload to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
