//! Validation report
//!
//! Constraint violations are data returned alongside the hydrated
//! result, not errors: callers decide whether to reject, redistribute,
//! or surface for manual review.

use crate::domain::RealId;
use serde::Serialize;

/// One violated constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintViolation {
    /// Name of the violated rule
    pub rule: String,
    /// Offending entity
    pub entity: RealId,
    /// Scheduling cycle the violation occurred in, for per-cycle rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    /// Recomputed aggregate value; wider than the per-assignment unit
    /// type so untrusted inputs cannot overflow it
    pub observed: u64,
    /// Rule threshold
    pub threshold: u64,
    /// Absolute magnitude of the violation (excess over a ceiling,
    /// shortfall under a floor)
    pub over_by: u64,
}

/// Report produced by the constraint validator
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// All violations found, in record order
    pub violations: Vec<ConstraintViolation>,
    /// Number of hydrated records checked
    pub records_checked: usize,
    /// Number of rules applied
    pub rules_applied: usize,
}

impl ValidationReport {
    /// Whether no constraint was violated
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations concerning a specific entity
    pub fn violations_for(&self, entity: &RealId) -> Vec<&ConstraintViolation> {
        self.violations
            .iter()
            .filter(|v| &v.entity == entity)
            .collect()
    }

    /// One-line summary for logs and notifications
    pub fn summary(&self) -> String {
        format!(
            "{} violation(s) across {} record(s) and {} rule(s)",
            self.violations.len(),
            self.records_checked,
            self.rules_applied
        )
    }
}
