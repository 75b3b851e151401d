//! Declarative constraint rules
//!
//! Hard business limits expressed as (aggregate, comparator, threshold)
//! tuples per entity kind. Rules are data; evaluation lives in the
//! validator.

use crate::domain::EntityKind;
use serde::{Deserialize, Serialize};

/// Aggregate recomputed from the hydrated result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    /// Sum of assigned units across all assignments of an entity
    TotalUnits,
    /// Sum of assigned units per scheduling cycle of an entity
    UnitsPerCycle,
}

/// Comparison against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Aggregate must not exceed the threshold
    AtMost,
    /// Aggregate must reach the threshold, when non-zero at all
    AtLeast,
}

/// One hard constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRule {
    /// Rule name, reported on violations
    pub name: String,
    /// Entity kind the rule applies to
    pub kind: EntityKind,
    /// Aggregate to recompute
    pub aggregate: Aggregate,
    /// Comparison direction
    pub comparator: Comparator,
    /// Threshold value in units
    pub threshold: u32,
}

impl ConstraintRule {
    /// Maximum total assigned units per staff member per week
    pub fn weekly_ceiling(threshold: u32) -> Self {
        Self {
            name: "weekly_ceiling".to_string(),
            kind: EntityKind::Staff,
            aggregate: Aggregate::TotalUnits,
            comparator: Comparator::AtMost,
            threshold,
        }
    }

    /// Minimum assigned units per staff member per cycle, when assigned
    /// at all
    pub fn daily_floor(threshold: u32) -> Self {
        Self {
            name: "daily_floor".to_string(),
            kind: EntityKind::Staff,
            aggregate: Aggregate::UnitsPerCycle,
            comparator: Comparator::AtLeast,
            threshold,
        }
    }
}
