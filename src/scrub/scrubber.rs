//! Free-text PII scrubber
//!
//! Defense-in-depth layer for free-text fields (notes, transcripts)
//! that may contain PII typed by a human, as a backstop to the
//! structured anonymizer. Regex scrubbing is probabilistic, not
//! provably complete; callers that need a hard guarantee use
//! [`Scrubber::clean_checked`] and omit the field when masking cannot
//! be confirmed.

use crate::scrub::patterns::ScrubRuleSet;
use std::sync::Arc;

/// Rule-based text sanitizer
///
/// Applies ordered, non-overlapping regex replacements: phone numbers
/// become `[PHONE_MASKED]`, two-capitalized-word sequences become
/// `[NAME_MASKED]`, currency amounts become `[FISCAL_MASKED]`.
///
/// `clean` is a pure function over its input: idempotent (masks do not
/// re-match any rule), never errors, and a no-op when nothing matches.
#[derive(Clone)]
pub struct Scrubber {
    rules: Arc<ScrubRuleSet>,
}

impl Scrubber {
    /// Create a scrubber with the embedded default rule library
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            rules: Arc::new(ScrubRuleSet::default_rules()?),
        })
    }

    /// Create a scrubber over an existing rule set
    pub fn with_rules(rules: Arc<ScrubRuleSet>) -> Self {
        Self { rules }
    }

    /// The rule set backing this scrubber
    pub fn rules(&self) -> &ScrubRuleSet {
        &self.rules
    }

    /// Mask residual PII in free text
    ///
    /// Empty input returns an empty string; absence of a match is a
    /// no-op, not an error.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut current = text.to_string();
        for rule in self.rules.rules() {
            for regex in &rule.regexes {
                if regex.is_match(&current) {
                    current = regex.replace_all(&current, rule.mask.as_str()).into_owned();
                }
            }
        }
        current
    }

    /// Fail-closed variant of [`clean`](Self::clean)
    ///
    /// Returns `None` when residual PII still matches after cleaning,
    /// so the caller omits the field from the external payload rather
    /// than sending it un-scrubbed.
    pub fn clean_checked(&self, text: &str) -> Option<String> {
        let cleaned = self.clean(text);
        if self.contains_pii(&cleaned) {
            tracing::warn!("Residual PII survived scrubbing; field will be omitted");
            return None;
        }
        Some(cleaned)
    }

    /// Whether any scrub rule matches the given text
    pub fn contains_pii(&self, text: &str) -> bool {
        self.rules
            .rules()
            .iter()
            .any(|rule| rule.regexes.iter().any(|r| r.is_match(text)))
    }
}
