//! Structured anonymization
//!
//! Conversion of domain entities into token payloads: tokens for
//! identifiers, tiers for exact figures, element-wise translation for
//! cross-references.

pub mod anonymizer;
pub mod bucket;
pub mod payload;

pub use anonymizer::Anonymizer;
pub use bucket::MonetaryTier;
pub use payload::{TokenPayload, TokenRecord};
