//! Hydration
//!
//! Reverses the anonymizer: re-attaches human-readable fields to the
//! external result while preserving everything the result contributed
//! (ordering, scores, assignments, rationale). Records referencing
//! tokens the vault never issued are boundary-integrity violations:
//! they are dropped and reported, never fatal to the batch.

use crate::boundary::schema::{Assignment, ExternalResult};
use crate::domain::{AnonymizedId, Entity, EntityKind, RealId, VeilError};
use crate::vault::IdentityVault;
use serde::Serialize;
use std::collections::HashMap;

/// One hydrated record: the external record with real display fields
/// re-attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydratedRecord {
    /// Real internal identifier
    pub real_id: RealId,
    /// Entity kind
    pub kind: EntityKind,
    /// Full name, restored from the source entity
    pub name: String,
    /// Street address, restored from the source entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Role, restored from the source entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Sector, restored from the source entity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Assignments, passed through verbatim
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<Assignment>,
    /// Derived score, passed through verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Derived recommendation, passed through verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    /// Natural-language rationale, passed through verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// A record dropped during hydration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    /// The token as the external service sent it
    pub token: String,
    /// Why the record was dropped
    pub reason: String,
}

/// Hydrated result: surviving records in original order, plus the
/// boundary-integrity violations encountered
#[derive(Debug, Clone, Default, Serialize)]
pub struct HydratedResult {
    /// Hydrated records in the order the external service produced them
    pub records: Vec<HydratedRecord>,
    /// Records dropped because the external party referenced an entity
    /// it was never given
    pub dropped: Vec<DroppedRecord>,
}

impl HydratedResult {
    /// Whether every external record survived hydration
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }
}

/// Re-attach real-world fields to an external result
///
/// Unknown tokens and tokens resolving to entities absent from the
/// request are dropped and logged; the rest of the batch survives.
pub fn hydrate(
    result: &ExternalResult,
    vault: &IdentityVault,
    entities: &[Entity],
) -> HydratedResult {
    let index: HashMap<&RealId, &Entity> =
        entities.iter().map(|e| (&e.real_id, e)).collect();

    let mut hydrated = HydratedResult::default();

    for record in &result.records {
        let token = match AnonymizedId::new(record.id.clone()) {
            Ok(token) => token,
            Err(reason) => {
                tracing::warn!(token = %record.id, "Dropping record with invalid token");
                hydrated.dropped.push(DroppedRecord {
                    token: record.id.clone(),
                    reason,
                });
                continue;
            }
        };

        let real_id = match vault.resolve(&token) {
            Ok(real_id) => real_id,
            Err(VeilError::UnknownToken(_)) => {
                tracing::warn!(
                    token = %token,
                    "External result referenced a token this vault never issued"
                );
                hydrated.dropped.push(DroppedRecord {
                    token: token.into_inner(),
                    reason: "unknown token".to_string(),
                });
                continue;
            }
            Err(err) => {
                tracing::warn!(token = %token, error = %err, "Dropping unresolvable record");
                hydrated.dropped.push(DroppedRecord {
                    token: token.into_inner(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let Some(entity) = index.get(&real_id) else {
            tracing::warn!(
                token = %token,
                "Token resolved to an entity absent from this request"
            );
            hydrated.dropped.push(DroppedRecord {
                token: token.into_inner(),
                reason: "entity not in request".to_string(),
            });
            continue;
        };

        hydrated.records.push(HydratedRecord {
            real_id: entity.real_id.clone(),
            kind: entity.kind,
            name: entity.display.name.clone(),
            address: entity.display.address.clone(),
            role: entity.role.clone(),
            sector: entity.sector.clone(),
            assignments: record.assignments.clone(),
            score: record.score,
            recommendation: record.recommendation.clone(),
            rationale: record.rationale.clone(),
        });
    }

    hydrated
}
