//! End-to-end pipeline tests with a stubbed external boundary

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use veil::anonymize::TokenPayload;
use veil::boundary::ExternalBoundary;
use veil::config::{
    AuditConfig, BoundaryConfig, Environment, LoggingConfig, ScrubConfig, ValidationConfig,
    VeilConfig,
};
use veil::domain::{BoundaryError, DisplayFields, Entity, EntityKind, RealId, VeilError};
use veil::pipeline::PrivacyPipeline;
use veil::vault::IdentityVault;

/// Boundary stub that records every payload it was sent and answers from
/// a canned function over the tokens it received.
struct RecordingBoundary<F> {
    seen: Arc<Mutex<Vec<String>>>,
    respond: F,
}

impl<F> RecordingBoundary<F>
where
    F: Fn(&TokenPayload) -> Value + Send + Sync,
{
    fn new(respond: F) -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            respond,
        }
    }

    /// Handle to the recorded payloads, valid after the pipeline takes
    /// ownership of the boundary.
    fn seen(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.seen)
    }
}

#[async_trait]
impl<F> ExternalBoundary for RecordingBoundary<F>
where
    F: Fn(&TokenPayload) -> Value + Send + Sync,
{
    async fn call(&self, payload: &TokenPayload) -> Result<Value, BoundaryError> {
        self.seen
            .lock()
            .unwrap()
            .push(payload.to_json().expect("payload serializes"));
        Ok((self.respond)(payload))
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
        validation: ValidationConfig {
            weekly_ceiling: 40,
            daily_floor: 2,
        },
        audit: AuditConfig {
            enabled: false,
            ..AuditConfig::default()
        },
        logging: LoggingConfig::default(),
    }
}

fn jane_doe() -> Entity {
    Entity::new(
        RealId::new("client-7841").unwrap(),
        EntityKind::Client,
        DisplayFields::named("Jane Doe")
            .with_address("12 Elmwood Avenue")
            .with_phone("(555) 123-4567"),
    )
    .with_sector("North")
    .with_monetary_cents(240_000)
    .with_notes("prefers Jane Doe be reached at (555) 123-4567")
}

#[tokio::test]
async fn scenario_anonymize_externalize_hydrate() {
    let boundary = RecordingBoundary::new(|payload: &TokenPayload| {
        json!({
            "records": [{
                "id": payload.records[0].id.as_str(),
                "recommendation": "priority-A"
            }]
        })
    });
    let pipeline = PrivacyPipeline::new(&test_config(), boundary).unwrap();
    let vault = IdentityVault::new();
    let entities = vec![jane_doe()];

    let outcome = pipeline.run(&vault, &entities).await.unwrap();

    assert_eq!(outcome.hydrated.records.len(), 1);
    let record = &outcome.hydrated.records[0];
    assert_eq!(record.name, "Jane Doe");
    assert_eq!(record.sector.as_deref(), Some("North"));
    assert_eq!(record.recommendation.as_deref(), Some("priority-A"));
    assert!(outcome.report.is_clean());
}

#[tokio::test]
async fn no_sensitive_value_crosses_the_boundary() {
    let boundary = RecordingBoundary::new(|_| json!({"records": []}));
    let seen = boundary.seen();
    let pipeline = PrivacyPipeline::new(&test_config(), boundary).unwrap();
    let vault = IdentityVault::new();
    let entities = vec![jane_doe()];

    pipeline.run(&vault, &entities).await.unwrap();

    // Inspect exactly what the external service was shown.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let serialized = &seen[0];

    assert!(!serialized.contains("Jane Doe"));
    assert!(!serialized.contains("12 Elmwood Avenue"));
    assert!(!serialized.contains("(555) 123-4567"));
    assert!(!serialized.contains("123-4567"));
    assert!(!serialized.contains("240000"));
    assert!(!serialized.contains("client-7841"));
    // Categorical fields cross verbatim.
    assert!(serialized.contains("North"));
}

#[tokio::test]
async fn unknown_token_drops_record_not_batch() {
    let boundary = RecordingBoundary::new(|payload: &TokenPayload| {
        json!({
            "records": [
                {"id": "Z999", "recommendation": "priority-B"},
                {"id": payload.records[0].id.as_str(), "recommendation": "priority-A"}
            ]
        })
    });
    let pipeline = PrivacyPipeline::new(&test_config(), boundary).unwrap();
    let vault = IdentityVault::new();
    let entities = vec![jane_doe()];

    let outcome = pipeline.run(&vault, &entities).await.unwrap();

    assert_eq!(outcome.hydrated.records.len(), 1);
    assert_eq!(outcome.hydrated.dropped.len(), 1);
    assert_eq!(outcome.hydrated.dropped[0].token, "Z999");
    assert_eq!(outcome.hydrated.records[0].name, "Jane Doe");
}

#[tokio::test]
async fn ceiling_violation_reported_not_fatal() {
    let staff = Entity::new(
        RealId::new("s1").unwrap(),
        EntityKind::Staff,
        DisplayFields::named("Sam Organa"),
    )
    .with_role("nurse");

    let boundary = RecordingBoundary::new(|payload: &TokenPayload| {
        json!({
            "records": [{
                "id": payload.records[0].id.as_str(),
                "assignments": [
                    {"units": 20, "cycle": "mon"},
                    {"units": 15, "cycle": "tue"},
                    {"units": 10, "cycle": "wed"}
                ]
            }]
        })
    });
    let pipeline = PrivacyPipeline::new(&test_config(), boundary).unwrap();
    let vault = IdentityVault::new();

    let outcome = pipeline.run(&vault, &[staff]).await.unwrap();

    assert_eq!(outcome.hydrated.records.len(), 1);
    assert_eq!(outcome.report.violations.len(), 1);
    let violation = &outcome.report.violations[0];
    assert_eq!(violation.rule, "weekly_ceiling");
    assert_eq!(violation.observed, 45);
    assert_eq!(violation.over_by, 5);
}

#[tokio::test]
async fn malformed_shape_rejected_before_hydration() {
    let boundary = RecordingBoundary::new(|payload: &TokenPayload| {
        json!({
            "records": [{
                "id": payload.records[0].id.as_str(),
                "unexpected_field": 42
            }]
        })
    });
    let pipeline = PrivacyPipeline::new(&test_config(), boundary).unwrap();
    let vault = IdentityVault::new();

    let err = pipeline.run(&vault, &[jane_doe()]).await.unwrap_err();
    assert!(matches!(
        err,
        VeilError::Boundary(BoundaryError::Malformed(_))
    ));
}

#[tokio::test]
async fn retry_with_same_vault_reuses_tokens() {
    let first_tokens = Arc::new(Mutex::new(Vec::new()));
    let tokens_handle = Arc::clone(&first_tokens);
    let boundary = RecordingBoundary::new(move |payload: &TokenPayload| {
        tokens_handle
            .lock()
            .unwrap()
            .push(payload.records[0].id.as_str().to_string());
        json!({"records": []})
    });
    let pipeline = PrivacyPipeline::new(&test_config(), boundary).unwrap();
    let vault = IdentityVault::new();
    let entities = vec![jane_doe()];

    pipeline.run(&vault, &entities).await.unwrap();
    pipeline.run(&vault, &entities).await.unwrap();

    let tokens = first_tokens.lock().unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0], tokens[1]);
    assert_eq!(vault.len(), 1);
}

#[tokio::test]
async fn sensitive_value_in_categorical_field_fails_closed() {
    // The scrubber only runs over free text, so a phone number smuggled
    // into a categorical field must be caught by the outbound sweep.
    let boundary = RecordingBoundary::new(|_| json!({"records": []}));
    let seen = boundary.seen();
    let pipeline = PrivacyPipeline::new(&test_config(), boundary).unwrap();
    let vault = IdentityVault::new();
    let entities = vec![Entity::new(
        RealId::new("c1").unwrap(),
        EntityKind::Client,
        DisplayFields::named("Jane Doe"),
    )
    .with_sector("North / call (555) 123-4567")];

    let err = pipeline.run(&vault, &entities).await.unwrap_err();
    assert!(matches!(err, VeilError::LeakDetected(_)));
    // Nothing was sent.
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn audit_trail_never_holds_plaintext_ids() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("audit.log");
    let mut config = test_config();
    config.audit.enabled = true;
    config.audit.log_path = log_path.clone();

    let boundary = RecordingBoundary::new(|_| json!({"records": []}));
    let pipeline = PrivacyPipeline::new(&config, boundary).unwrap();
    let vault = IdentityVault::new();

    let outcome = pipeline.run(&vault, &[jane_doe()]).await.unwrap();

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.contains(&outcome.run_id.to_string()));
    assert!(!content.contains("client-7841"));
    assert!(!content.contains("Jane Doe"));
}

#[tokio::test]
async fn cross_references_hydrate_through_stable_tokens() {
    // A client excludes a staff member; the optimizer echoes both
    // tokens back and both hydrate to their original entities.
    let staff_id = RealId::new("s7").unwrap();
    let client = Entity::new(
        RealId::new("c1").unwrap(),
        EntityKind::Client,
        DisplayFields::named("Jane Doe"),
    )
    .with_excluded(staff_id.clone(), EntityKind::Staff);
    let staff = Entity::new(
        staff_id,
        EntityKind::Staff,
        DisplayFields::named("Sam Organa"),
    );

    let boundary = RecordingBoundary::new(|payload: &TokenPayload| {
        let records: Vec<Value> = payload
            .records
            .iter()
            .map(|r| json!({"id": r.id.as_str(), "score": 0.5}))
            .collect();
        json!({ "records": records })
    });
    let pipeline = PrivacyPipeline::new(&test_config(), boundary).unwrap();
    let vault = IdentityVault::new();
    let entities = vec![client, staff];

    let outcome = pipeline.run(&vault, &entities).await.unwrap();

    assert_eq!(outcome.hydrated.records.len(), 2);
    assert!(outcome.hydrated.is_complete());
    let names: Vec<&str> = outcome
        .hydrated
        .records
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert!(names.contains(&"Jane Doe"));
    assert!(names.contains(&"Sam Organa"));
}
