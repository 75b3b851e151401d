//! Constraint validation
//!
//! Trust-boundary enforcement: the external reasoning call is assumed
//! untrusted and approximate, so hard business constraints are
//! re-checked against the hydrated result before it is applied.
//! Aggregates are recomputed here from scratch; nothing the external
//! party claims is trusted.

pub mod report;
pub mod rules;

pub use report::{ConstraintViolation, ValidationReport};
pub use rules::{Aggregate, Comparator, ConstraintRule};

use crate::hydrate::{HydratedRecord, HydratedResult};
use std::collections::BTreeMap;

/// Re-checks hard constraints against a hydrated result
///
/// The validator never mutates the result; its output is a
/// [`ValidationReport`] the caller acts on.
pub struct ConstraintValidator {
    rules: Vec<ConstraintRule>,
}

impl ConstraintValidator {
    /// Create a validator over a rule set
    pub fn new(rules: Vec<ConstraintRule>) -> Self {
        Self { rules }
    }

    /// The configured rules
    pub fn rules(&self) -> &[ConstraintRule] {
        &self.rules
    }

    /// Evaluate every rule against every hydrated record
    pub fn validate(&self, result: &HydratedResult) -> ValidationReport {
        let mut report = ValidationReport {
            records_checked: result.records.len(),
            rules_applied: self.rules.len(),
            ..ValidationReport::default()
        };

        for record in &result.records {
            for rule in &self.rules {
                if record.kind != rule.kind {
                    continue;
                }
                self.check_rule(record, rule, &mut report);
            }
        }

        report
    }

    fn check_rule(
        &self,
        record: &HydratedRecord,
        rule: &ConstraintRule,
        report: &mut ValidationReport,
    ) {
        match rule.aggregate {
            Aggregate::TotalUnits => {
                // Units come from the untrusted external result; sum in
                // u64 so crafted u32::MAX values cannot overflow the
                // aggregate and slip past the ceiling.
                let total: u64 = record.assignments.iter().map(|a| u64::from(a.units)).sum();
                if let Some(violation) = compare(rule, &record.real_id, None, total) {
                    report.violations.push(violation);
                }
            }
            Aggregate::UnitsPerCycle => {
                // BTreeMap keeps violation output deterministic.
                let mut per_cycle: BTreeMap<String, u64> = BTreeMap::new();
                for assignment in &record.assignments {
                    let cycle = assignment.cycle.clone().unwrap_or_default();
                    *per_cycle.entry(cycle).or_insert(0) += u64::from(assignment.units);
                }
                for (cycle, total) in per_cycle {
                    if let Some(violation) =
                        compare(rule, &record.real_id, Some(cycle), total)
                    {
                        report.violations.push(violation);
                    }
                }
            }
        }
    }
}

/// Compare a recomputed aggregate against a rule threshold
///
/// Floor rules only fire for non-zero aggregates: "at least N units per
/// cycle" applies when assigned at all.
fn compare(
    rule: &ConstraintRule,
    entity: &crate::domain::RealId,
    cycle: Option<String>,
    observed: u64,
) -> Option<ConstraintViolation> {
    let threshold = u64::from(rule.threshold);
    let over_by = match rule.comparator {
        Comparator::AtMost => (observed > threshold).then(|| observed - threshold),
        Comparator::AtLeast => {
            (observed > 0 && observed < threshold).then(|| threshold - observed)
        }
    }?;

    Some(ConstraintViolation {
        rule: rule.name.clone(),
        entity: entity.clone(),
        cycle,
        observed,
        threshold,
        over_by,
    })
}
