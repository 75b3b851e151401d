//! Pipeline engine
//!
//! Orchestrates one request through the privacy boundary:
//! anonymize (with scrubbing) → leak check → external call → strict
//! parse → hydrate → constraint validation. The engine owns no
//! cross-request state; the vault is passed in per request or session.

use crate::anonymize::{Anonymizer, TokenPayload};
use crate::audit::AuditLogger;
use crate::boundary::{parse_external_result, ExternalBoundary};
use crate::config::VeilConfig;
use crate::domain::{BoundaryError, Entity, Result, VeilError};
use crate::hydrate::{hydrate, HydratedResult};
use crate::notify::{Notification, Notifier, Severity, TracingNotifier};
use crate::scrub::{ScrubRuleSet, Scrubber};
use crate::validate::{ConstraintRule, ConstraintValidator, ValidationReport};
use crate::vault::IdentityVault;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

/// Result of one pipeline run
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Run identifier, correlating log and audit entries
    pub run_id: Uuid,
    /// Hydrated records plus boundary-integrity drops
    pub hydrated: HydratedResult,
    /// Constraint validation report; violations are data, the caller
    /// decides on remediation
    pub report: ValidationReport,
}

/// The privacy-boundary pipeline
///
/// Generic over the boundary implementation so tests can substitute a
/// stub for the external reasoning service.
pub struct PrivacyPipeline<B: ExternalBoundary> {
    boundary: B,
    anonymizer: Anonymizer,
    scrubber: Scrubber,
    validator: ConstraintValidator,
    notifier: Arc<dyn Notifier>,
    audit: Option<AuditLogger>,
    boundary_timeout: Duration,
}

impl<B: ExternalBoundary> PrivacyPipeline<B> {
    /// Build a pipeline from configuration and a boundary implementation
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the scrub rule library cannot
    /// be loaded or the audit logger cannot be initialized.
    pub fn new(config: &VeilConfig, boundary: B) -> Result<Self> {
        let rules = match &config.scrub.rule_library {
            Some(path) => ScrubRuleSet::from_file(path),
            None => ScrubRuleSet::default_rules(),
        }
        .map_err(|e| VeilError::Configuration(format!("Invalid scrub rule library: {e}")))?;
        let scrubber = Scrubber::with_rules(Arc::new(rules));

        let validator = ConstraintValidator::new(vec![
            ConstraintRule::weekly_ceiling(config.validation.weekly_ceiling),
            ConstraintRule::daily_floor(config.validation.daily_floor),
        ]);

        let audit = if config.audit.enabled {
            Some(
                AuditLogger::new(
                    config.audit.log_path.clone(),
                    config.audit.json_format,
                    true,
                )
                .map_err(|e| VeilError::Audit(e.to_string()))?,
            )
        } else {
            None
        };

        Ok(Self {
            boundary,
            anonymizer: Anonymizer::new(scrubber.clone()),
            scrubber,
            validator,
            notifier: Arc::new(TracingNotifier::new()),
            audit,
            boundary_timeout: Duration::from_secs(config.boundary.timeout_seconds),
        })
    }

    /// Replace the default tracing notifier with a collaborator
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Run one batch through the pipeline
    ///
    /// The vault is request- or session-scoped and passed by reference;
    /// tokens minted here stay stable for the vault's lifetime, so a
    /// caller retry reuses them.
    ///
    /// # Errors
    ///
    /// - [`VeilError::VaultCollision`] aborts the request (internal bug)
    /// - [`VeilError::LeakDetected`] fails closed before externalization
    /// - [`VeilError::Boundary`] surfaces boundary failures as
    ///   retryable; the pipeline never retries internally
    pub async fn run(
        &self,
        vault: &IdentityVault,
        entities: &[Entity],
    ) -> Result<PipelineOutcome> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_run", %run_id, entities = entities.len());
        self.run_inner(run_id, vault, entities).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        vault: &IdentityVault,
        entities: &[Entity],
    ) -> Result<PipelineOutcome> {
        if entities.is_empty() {
            return Ok(PipelineOutcome {
                run_id,
                hydrated: HydratedResult::default(),
                report: ValidationReport::default(),
            });
        }

        let payload = self.anonymizer.anonymize(entities, vault)?;
        self.leak_check(&payload, entities).await?;
        tracing::info!(records = payload.len(), "Payload anonymized");

        let raw = tokio::time::timeout(self.boundary_timeout, self.boundary.call(&payload))
            .await
            .map_err(|_| {
                BoundaryError::Timeout(format!("{}s", self.boundary_timeout.as_secs()))
            })?
            .map_err(VeilError::Boundary)?;

        let result = parse_external_result(raw).map_err(VeilError::Boundary)?;
        tracing::info!(records = result.records.len(), "External result validated");

        let hydrated = hydrate(&result, vault, entities);
        if !hydrated.is_complete() {
            self.send_notification(Notification::new(
                Severity::Warning,
                format!(
                    "{} record(s) dropped during hydration: external party referenced unknown tokens",
                    hydrated.dropped.len()
                ),
                vec!["operations".to_string()],
            ))
            .await;
        }

        let report = self.validator.validate(&hydrated);
        if !report.is_clean() {
            self.send_notification(Notification::new(
                Severity::Warning,
                format!("Constraint check failed: {}", report.summary()),
                vec!["operations".to_string()],
            ))
            .await;
        }

        if let Some(ref audit) = self.audit {
            let real_ids: Vec<String> = payload
                .records
                .iter()
                .filter_map(|r| vault.resolve(&r.id).ok())
                .map(|id| id.into_inner())
                .collect();
            if let Err(e) = audit.log_run(
                run_id,
                &payload,
                &real_ids,
                hydrated.dropped.len(),
                report.violations.len(),
            ) {
                tracing::error!(error = %e, "Failed to write audit entry");
            }
        }

        Ok(PipelineOutcome {
            run_id,
            hydrated,
            report,
        })
    }

    /// Final sweep before externalization
    ///
    /// Checks the serialized payload for each entity's exact sensitive
    /// values and for anything the phone/currency scrub rules would
    /// match. Any hit fails the request closed.
    async fn leak_check(&self, payload: &TokenPayload, entities: &[Entity]) -> Result<()> {
        let serialized = payload.to_json()?;

        for entity in entities {
            let mut sensitive: Vec<&str> = vec![entity.display.name.as_str()];
            if let Some(ref address) = entity.display.address {
                sensitive.push(address);
            }
            if let Some(ref phone) = entity.display.phone {
                sensitive.push(phone);
            }
            for value in sensitive {
                if value.is_empty() {
                    continue;
                }
                // Serde escapes quotes, backslashes and control
                // characters, so the needle must be escaped the same
                // way or values containing them would slip through.
                if serialized.contains(json_escape(value)?.as_str()) {
                    return self.fail_leak(&entity.real_id.to_string()).await;
                }
            }
            if let Some(cents) = entity.monetary_cents {
                let digits = cents.abs().to_string();
                // Short digit runs collide with categorical values; exact
                // amounts of interest are at least four digits of cents.
                if digits.len() >= 4 && serialized.contains(&digits) {
                    return self.fail_leak(&entity.real_id.to_string()).await;
                }
            }
        }

        // Free text already went through the scrubber; this catches
        // phone numbers and amounts smuggled in via categorical fields.
        for rule_name in ["phone", "currency"] {
            if let Some(rule) = self.scrubber.rules().rule(rule_name) {
                if rule.regexes.iter().any(|r| r.is_match(&serialized)) {
                    return self.fail_leak("payload sweep").await;
                }
            }
        }

        Ok(())
    }

    async fn fail_leak(&self, context: &str) -> Result<()> {
        self.send_notification(Notification::new(
            Severity::Critical,
            "Sensitive value detected in outbound payload; request aborted",
            vec!["operations".to_string(), "compliance".to_string()],
        ))
        .await;
        Err(VeilError::LeakDetected(format!(
            "sensitive value detected ({context})"
        )))
    }

    async fn send_notification(&self, notification: Notification) {
        // Delivery guarantees are the collaborator's responsibility; a
        // failed delivery is logged and never fails the run.
        if let Err(e) = self.notifier.notify(notification).await {
            let err = match e {
                err @ VeilError::Notification(_) => err,
                other => VeilError::Notification(other.to_string()),
            };
            tracing::error!(error = %err, "Failed to deliver notification");
        }
    }
}

/// JSON-escaped form of a sensitive value, without the surrounding
/// quotes, for substring checks against serialized payload text
fn json_escape(value: &str) -> Result<String> {
    let quoted = serde_json::to_string(value)?;
    Ok(quoted[1..quoted.len() - 1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuditConfig, BoundaryConfig, Environment, LoggingConfig, ScrubConfig, ValidationConfig,
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StubBoundary {
        response: Value,
    }

    #[async_trait]
    impl ExternalBoundary for StubBoundary {
        async fn call(&self, _payload: &TokenPayload) -> std::result::Result<Value, BoundaryError> {
            Ok(self.response.clone())
        }
    }

    fn test_config() -> VeilConfig {
        VeilConfig {
            environment: Environment::Development,
            boundary: BoundaryConfig {
                endpoint: "https://optimizer.example.com/v1/plan".to_string(),
                api_key: None,
                timeout_seconds: 5,
            },
            scrub: ScrubConfig::default(),
            validation: ValidationConfig::default(),
            audit: AuditConfig {
                enabled: false,
                ..AuditConfig::default()
            },
            logging: LoggingConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let pipeline = PrivacyPipeline::new(
            &test_config(),
            StubBoundary {
                response: json!({"records": []}),
            },
        )
        .unwrap();
        let vault = IdentityVault::new();

        let outcome = pipeline.run(&vault, &[]).await.unwrap();
        assert!(outcome.hydrated.records.is_empty());
        assert!(outcome.report.is_clean());
    }

    #[tokio::test]
    async fn test_leak_sweep_matches_json_escaped_values() {
        use crate::domain::{DisplayFields, EntityKind, RealId};

        // A name containing quotes serializes with backslash escapes;
        // the sweep must still find it inside a categorical field.
        let pipeline = PrivacyPipeline::new(
            &test_config(),
            StubBoundary {
                response: json!({"records": []}),
            },
        )
        .unwrap();
        let vault = IdentityVault::new();
        let entities = vec![Entity::new(
            RealId::new("c1").unwrap(),
            EntityKind::Client,
            DisplayFields::named(r#"Jane "JJ" Doe"#),
        )
        .with_sector(r#"escalate to Jane "JJ" Doe"#)];

        let err = pipeline.run(&vault, &entities).await.unwrap_err();
        assert!(matches!(err, VeilError::LeakDetected(_)));
    }

    #[test]
    fn test_json_escape_needle() {
        assert_eq!(json_escape("Jane Doe").unwrap(), "Jane Doe");
        assert_eq!(json_escape(r#"Jane "JJ" Doe"#).unwrap(), r#"Jane \"JJ\" Doe"#);
    }

    struct FailingNotifier;

    #[async_trait]
    impl crate::notify::Notifier for FailingNotifier {
        async fn notify(&self, _notification: Notification) -> Result<()> {
            Err(VeilError::Notification("channel unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_notifier_failure_does_not_fail_the_run() {
        use crate::domain::{DisplayFields, EntityKind, RealId};

        // Response references an unknown token, which triggers a
        // warning notification; the failing notifier must not abort.
        let pipeline = PrivacyPipeline::new(
            &test_config(),
            StubBoundary {
                response: json!({"records": [{"id": "Z999"}]}),
            },
        )
        .unwrap()
        .with_notifier(std::sync::Arc::new(FailingNotifier));
        let vault = IdentityVault::new();
        let entities = vec![Entity::new(
            RealId::new("c1").unwrap(),
            EntityKind::Client,
            DisplayFields::named("Jane Doe"),
        )];

        let outcome = pipeline.run(&vault, &entities).await.unwrap();
        assert_eq!(outcome.hydrated.dropped.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_boundary_error() {
        use crate::domain::{DisplayFields, EntityKind, RealId};

        let pipeline = PrivacyPipeline::new(
            &test_config(),
            StubBoundary {
                response: json!({"unexpected": "shape"}),
            },
        )
        .unwrap();
        let vault = IdentityVault::new();
        let entities = vec![Entity::new(
            RealId::new("c1").unwrap(),
            EntityKind::Client,
            DisplayFields::named("Jane Doe"),
        )];

        let err = pipeline.run(&vault, &entities).await.unwrap_err();
        assert!(matches!(
            err,
            VeilError::Boundary(BoundaryError::Malformed(_))
        ));
    }
}
