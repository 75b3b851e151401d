//! Entity anonymizer
//!
//! Converts a batch of domain entities into a token payload using the
//! identity vault: direct identifiers become tokens, exact monetary
//! values become tiers, cross-references are translated element-wise,
//! and free-text notes pass through the scrubber fail-closed.

use crate::anonymize::bucket::MonetaryTier;
use crate::anonymize::payload::{TokenPayload, TokenRecord};
use crate::domain::{Entity, Result, VeilError};
use crate::scrub::Scrubber;
use crate::vault::IdentityVault;

/// Batch anonymizer
///
/// Deterministic: given the same vault state and the same entities, the
/// output is identical on every call. Batch processing is fail-safe per
/// entity: one that cannot be anonymized is skipped and logged, never
/// sent partially scrubbed. Vault collisions are the exception and are
/// fatal to the whole request.
pub struct Anonymizer {
    scrubber: Scrubber,
}

impl Anonymizer {
    /// Create an anonymizer over the given scrubber
    pub fn new(scrubber: Scrubber) -> Self {
        Self { scrubber }
    }

    /// Anonymize a batch of entities into a token payload
    ///
    /// An empty input set yields an empty payload, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::VaultCollision`] if token minting breaks
    /// the vault bijection; any other per-entity failure drops that
    /// entity from the payload.
    pub fn anonymize(&self, entities: &[Entity], vault: &IdentityVault) -> Result<TokenPayload> {
        let mut records = Vec::with_capacity(entities.len());

        for entity in entities {
            match self.anonymize_entity(entity, vault) {
                Ok(record) => records.push(record),
                Err(err @ VeilError::VaultCollision { .. }) => return Err(err),
                Err(err) => {
                    // Fail-safe: skip the entity rather than externalize
                    // anything unconfirmed.
                    tracing::error!(error = %err, "Failed to anonymize entity; skipping");
                    continue;
                }
            }
        }

        Ok(TokenPayload { records })
    }

    /// Anonymize a single entity
    fn anonymize_entity(&self, entity: &Entity, vault: &IdentityVault) -> Result<TokenRecord> {
        let id = vault.token_for(&entity.real_id, entity.kind)?;

        // Cross-referenced entities not yet tokenized are tokenized on
        // demand so the reference is never dropped or left as a real ID.
        let mut excluded = Vec::with_capacity(entity.excluded.len());
        for cross_ref in &entity.excluded {
            excluded.push(vault.token_for(&cross_ref.id, cross_ref.kind)?);
        }

        let notes = match &entity.notes {
            Some(text) => self.scrubber.clean_checked(text),
            None => None,
        };

        Ok(TokenRecord {
            id,
            kind: entity.kind,
            role: entity.role.clone(),
            sector: entity.sector.clone(),
            condition_tags: entity.condition_tags.clone(),
            availability: entity.availability.clone(),
            monetary_tier: entity.monetary_cents.map(MonetaryTier::from_cents),
            excluded,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayFields, EntityKind, RealId};

    fn anonymizer() -> Anonymizer {
        Anonymizer::new(Scrubber::new().unwrap())
    }

    fn client(id: &str, name: &str) -> Entity {
        Entity::new(
            RealId::new(id).unwrap(),
            EntityKind::Client,
            DisplayFields::named(name),
        )
    }

    #[test]
    fn test_empty_batch_yields_empty_payload() {
        let vault = IdentityVault::new();
        let payload = anonymizer().anonymize(&[], &vault).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_tokens_replace_real_ids() {
        let vault = IdentityVault::new();
        let entities = vec![client("c1", "Jane Doe").with_sector("North")];
        let payload = anonymizer().anonymize(&entities, &vault).unwrap();

        assert_eq!(payload.len(), 1);
        let record = &payload.records[0];
        assert_eq!(record.id.kind_prefix(), Some('C'));
        assert_eq!(record.sector.as_deref(), Some("North"));

        let json = payload.to_json().unwrap();
        assert!(!json.contains("Jane Doe"));
        assert!(!json.contains("c1\""));
    }

    #[test]
    fn test_monetary_bucketed_never_raw() {
        let vault = IdentityVault::new();
        let entities = vec![client("c1", "Jane Doe").with_monetary_cents(125_000)];
        let payload = anonymizer().anonymize(&entities, &vault).unwrap();

        assert_eq!(payload.records[0].monetary_tier, Some(MonetaryTier::Moderate));
        let json = payload.to_json().unwrap();
        assert!(!json.contains("125000"));
    }

    #[test]
    fn test_cross_references_translated_lazily() {
        let vault = IdentityVault::new();
        let entities = vec![client("c1", "Jane Doe").with_excluded(
            RealId::new("s9").unwrap(),
            EntityKind::Staff,
        )];
        let payload = anonymizer().anonymize(&entities, &vault).unwrap();

        let excluded = &payload.records[0].excluded;
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].kind_prefix(), Some('S'));
        // The referent was tokenized on demand and is now stable.
        assert_eq!(
            vault
                .token_for(&RealId::new("s9").unwrap(), EntityKind::Staff)
                .unwrap(),
            excluded[0]
        );
    }

    #[test]
    fn test_notes_scrubbed() {
        let vault = IdentityVault::new();
        let entities =
            vec![client("c1", "Jane Doe").with_notes("call Jane Doe at (555) 123-4567")];
        let payload = anonymizer().anonymize(&entities, &vault).unwrap();

        let notes = payload.records[0].notes.as_deref().unwrap();
        assert!(notes.contains("[NAME_MASKED]"));
        assert!(notes.contains("[PHONE_MASKED]"));
    }

    #[test]
    fn test_determinism() {
        let vault = IdentityVault::new();
        let entities = vec![
            client("c1", "Jane Doe").with_sector("North"),
            client("c2", "John Roe").with_sector("South"),
        ];
        let a = anonymizer().anonymize(&entities, &vault).unwrap();
        let b = anonymizer().anonymize(&entities, &vault).unwrap();
        assert_eq!(a, b);
    }
}
