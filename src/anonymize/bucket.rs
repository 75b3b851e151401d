//! Numeric bucketing
//!
//! Exact monetary figures never cross the external boundary; they are
//! collapsed into a small fixed set of magnitude tiers so that
//! precision cannot be used for re-identification.

use serde::{Deserialize, Serialize};

/// Monetary magnitude tier
///
/// Threshold table (amounts in cents):
///
/// | Tier       | Range                      |
/// |------------|----------------------------|
/// | `Minimal`  | < 10,000 (under $100)      |
/// | `Low`      | 10,000 .. 49,999           |
/// | `Moderate` | 50,000 .. 199,999          |
/// | `High`     | 200,000 .. 999,999         |
/// | `Premium`  | >= 1,000,000 ($10k and up) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonetaryTier {
    Minimal,
    Low,
    Moderate,
    High,
    Premium,
}

impl MonetaryTier {
    /// Bucket an exact amount (in cents) into its tier
    ///
    /// Negative amounts (credits, adjustments) bucket by magnitude.
    pub fn from_cents(cents: i64) -> Self {
        match cents.unsigned_abs() {
            0..=9_999 => Self::Minimal,
            10_000..=49_999 => Self::Low,
            50_000..=199_999 => Self::Moderate,
            200_000..=999_999 => Self::High,
            _ => Self::Premium,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Premium => "premium",
        }
    }
}
