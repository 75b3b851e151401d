//! Free-text scrubbing
//!
//! Regex/rule-based sanitization of free-text payloads before they
//! reach the anonymizer or any external call.

pub mod patterns;
pub mod scrubber;

pub use patterns::{ScrubRule, ScrubRuleSet};
pub use scrubber::Scrubber;
