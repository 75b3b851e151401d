//! Scrub rule library
//!
//! Ordered masking rules loaded from TOML. A built-in library is
//! embedded in the binary; deployments can override it with a file.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Rule definition from TOML
#[derive(Debug, Clone, Deserialize)]
struct RuleDefinition {
    /// Rule name (e.g. "phone")
    name: String,
    /// Application order (ascending)
    order: u32,
    /// Replacement mask (e.g. "[PHONE_MASKED]")
    mask: String,
    /// Regex patterns for this rule
    patterns: Vec<String>,
}

/// Rule library container
#[derive(Debug, Deserialize)]
struct RuleLibrary {
    rules: Vec<RuleDefinition>,
}

/// Compiled scrub rule
#[derive(Debug, Clone)]
pub struct ScrubRule {
    /// Rule name
    pub name: String,
    /// Replacement mask
    pub mask: String,
    /// Compiled regexes
    pub regexes: Vec<Regex>,
    /// Application order
    pub order: u32,
}

/// Compiled, ordered set of scrub rules
#[derive(Debug, Clone)]
pub struct ScrubRuleSet {
    rules: Vec<ScrubRule>,
}

impl ScrubRuleSet {
    /// Load a rule set from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read scrub rule library: {}", path.as_ref().display())
        })?;
        Self::from_toml(&content)
    }

    /// Load a rule set from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let library: RuleLibrary =
            toml::from_str(content).context("Failed to parse scrub rule library TOML")?;

        let mut rules = Vec::with_capacity(library.rules.len());
        for def in library.rules {
            let mut regexes = Vec::with_capacity(def.patterns.len());
            for pattern_str in &def.patterns {
                let regex = Regex::new(pattern_str).with_context(|| {
                    format!("Invalid regex in rule '{}': {pattern_str}", def.name)
                })?;
                regexes.push(regex);
            }
            rules.push(ScrubRule {
                name: def.name,
                mask: def.mask,
                regexes,
                order: def.order,
            });
        }

        rules.sort_by_key(|r| r.order);

        let set = Self { rules };
        set.check_mask_stability()?;
        Ok(set)
    }

    /// Load the embedded default rule set
    pub fn default_rules() -> Result<Self> {
        let default_toml = include_str!("../../patterns/scrub_rules.toml");
        Self::from_toml(default_toml)
    }

    /// All rules in application order
    pub fn rules(&self) -> &[ScrubRule] {
        &self.rules
    }

    /// Look up a rule by name
    pub fn rule(&self, name: &str) -> Option<&ScrubRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Reject a library whose masks re-match any rule.
    ///
    /// Masks that match a rule would break the idempotence contract of
    /// `clean()` (a second pass would mangle already-masked text).
    fn check_mask_stability(&self) -> Result<()> {
        for rule in &self.rules {
            for other in &self.rules {
                for regex in &other.regexes {
                    if regex.is_match(&rule.mask) {
                        anyhow::bail!(
                            "Mask '{}' of rule '{}' matches rule '{}'; library is not idempotent",
                            rule.mask,
                            rule.name,
                            other.name
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_rules() {
        let set = ScrubRuleSet::default_rules().unwrap();
        assert!(!set.rules().is_empty());
    }

    #[test]
    fn test_rules_sorted_by_order() {
        let set = ScrubRuleSet::default_rules().unwrap();
        let orders: Vec<u32> = set.rules().iter().map(|r| r.order).collect();
        let mut sorted = orders.clone();
        sorted.sort_unstable();
        assert_eq!(orders, sorted);
    }

    #[test]
    fn test_phone_rule_matches() {
        let set = ScrubRuleSet::default_rules().unwrap();
        let phone = set.rule("phone").unwrap();
        assert!(phone.regexes.iter().any(|r| r.is_match("(555) 123-4567")));
        assert!(phone.regexes.iter().any(|r| r.is_match("555-123-4567")));
    }

    #[test]
    fn test_currency_rule_matches() {
        let set = ScrubRuleSet::default_rules().unwrap();
        let currency = set.rule("currency").unwrap();
        assert!(currency.regexes.iter().any(|r| r.is_match("$1,250.00")));
        assert!(currency.regexes.iter().any(|r| r.is_match("1,250 USD")));
    }

    #[test]
    fn test_name_rule_matches() {
        let set = ScrubRuleSet::default_rules().unwrap();
        let name = set.rule("name").unwrap();
        assert!(name.regexes.iter().any(|r| r.is_match("Jane Doe")));
        assert!(!name.regexes.iter().any(|r| r.is_match("[NAME_MASKED]")));
    }

    #[test]
    fn test_unstable_mask_rejected() {
        let toml = r#"
            [[rules]]
            name = "name"
            order = 10
            mask = "Masked Person"
            patterns = ['\b[A-Z][a-z]+\s+[A-Z][a-z]+\b']
        "#;
        assert!(ScrubRuleSet::from_toml(toml).is_err());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let toml = r#"
            [[rules]]
            name = "broken"
            order = 10
            mask = "[X]"
            patterns = ['(unclosed']
        "#;
        assert!(ScrubRuleSet::from_toml(toml).is_err());
    }
}
