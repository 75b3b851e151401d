//! Audit logger for pipeline runs
//!
//! Records every anonymization operation as an append-only log entry.
//! Real identifiers are SHA-256 hashed; plaintext sensitive values are
//! never written.

use crate::anonymize::TokenPayload;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Audit log entry for one pipeline run
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    run_id: String,
    records: usize,
    dropped: usize,
    violations: usize,
    tokens: Vec<AuditToken>,
}

/// Token issuance record (real ID hashed, never plaintext)
#[derive(Debug, Serialize)]
struct AuditToken {
    token: String,
    kind: String,
    /// SHA-256 hash of the real ID behind the token
    real_id_hash: String,
}

/// Append-only audit logger
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Log one pipeline run
    ///
    /// `real_ids` pairs each payload record with the real ID it was
    /// minted for, in payload order.
    pub fn log_run(
        &self,
        run_id: Uuid,
        payload: &TokenPayload,
        real_ids: &[String],
        dropped: usize,
        violations: usize,
    ) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let tokens = payload
            .records
            .iter()
            .zip(real_ids)
            .map(|(record, real_id)| AuditToken {
                token: record.id.to_string(),
                kind: record.kind.label().to_string(),
                real_id_hash: hash_value(real_id),
            })
            .collect();

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            run_id: run_id.to_string(),
            records: payload.len(),
            dropped,
            violations,
            tokens,
        };

        self.write_entry(&entry)
    }

    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        if self.json_format {
            let json_line =
                serde_json::to_string(entry).context("Failed to serialize audit entry")?;
            writeln!(file, "{json_line}").context("Failed to write audit entry")?;
        } else {
            writeln!(
                file,
                "[{}] Run: {} | Records: {} | Dropped: {} | Violations: {}",
                entry.timestamp, entry.run_id, entry.records, entry.dropped, entry.violations
            )
            .context("Failed to write audit entry")?;
        }

        Ok(())
    }
}

/// Hash a sensitive value with SHA-256
fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymize::Anonymizer;
    use crate::domain::{DisplayFields, Entity, EntityKind, RealId};
    use crate::scrub::Scrubber;
    use crate::vault::IdentityVault;
    use tempfile::tempdir;

    #[test]
    fn test_hash_is_stable_and_distinct() {
        assert_eq!(hash_value("c1"), hash_value("c1"));
        assert_ne!(hash_value("c1"), hash_value("c2"));
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();

        logger
            .log_run(Uuid::new_v4(), &TokenPayload::default(), &[], 0, 0)
            .unwrap();
        assert!(!log_path.exists());
    }

    #[test]
    fn test_log_run_hashes_real_ids() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        let vault = IdentityVault::new();
        let entities = vec![Entity::new(
            RealId::new("client-7841").unwrap(),
            EntityKind::Client,
            DisplayFields::named("Jane Doe"),
        )];
        let payload = Anonymizer::new(Scrubber::new().unwrap())
            .anonymize(&entities, &vault)
            .unwrap();

        logger
            .log_run(
                Uuid::new_v4(),
                &payload,
                &["client-7841".to_string()],
                0,
                0,
            )
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(!content.contains("client-7841"));
        assert!(!content.contains("Jane Doe"));
        assert!(content.contains(payload.records[0].id.as_str()));
    }
}
