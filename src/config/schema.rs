//! Configuration schema types

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Veil configuration
///
/// Root structure mapping to the TOML configuration file.
#[derive(Debug, Serialize, Deserialize)]
pub struct VeilConfig {
    /// Runtime environment
    #[serde(default)]
    pub environment: Environment,

    /// External boundary configuration
    pub boundary: BoundaryConfig,

    /// Scrubber configuration
    #[serde(default)]
    pub scrub: ScrubConfig,

    /// Constraint validation thresholds
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,

    /// Structured logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VeilConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.boundary.validate(&self.environment)?;
        self.scrub.validate()?;
        self.validation.validate()?;
        self.audit.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// External boundary configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct BoundaryConfig {
    /// Endpoint URL of the external reasoning service
    pub endpoint: String,

    /// API key for the external service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_boundary_timeout")]
    pub timeout_seconds: u64,
}

fn default_boundary_timeout() -> u64 {
    30
}

impl BoundaryConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        let url = Url::parse(&self.endpoint)
            .map_err(|e| format!("boundary.endpoint is not a valid URL: {e}"))?;

        if *environment == Environment::Production && url.scheme() != "https" {
            return Err("boundary.endpoint must use https in production".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("boundary.timeout_seconds must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Scrubber configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrubConfig {
    /// Path to a scrub rule library TOML file; the embedded default
    /// library is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_library: Option<PathBuf>,
}

impl ScrubConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.rule_library {
            if !path.exists() {
                return Err(format!("scrub.rule_library not found: {}", path.display()));
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                return Err(format!(
                    "scrub.rule_library must be a TOML file: {}",
                    path.display()
                ));
            }
        }
        Ok(())
    }
}

/// Constraint validation thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum total assigned units per staff member per week
    #[serde(default = "default_weekly_ceiling")]
    pub weekly_ceiling: u32,

    /// Minimum assigned units per staff member per cycle, when assigned
    /// at all
    #[serde(default = "default_daily_floor")]
    pub daily_floor: u32,
}

fn default_weekly_ceiling() -> u32 {
    40
}

fn default_daily_floor() -> u32 {
    2
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            weekly_ceiling: default_weekly_ceiling(),
            daily_floor: default_daily_floor(),
        }
    }
}

impl ValidationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.weekly_ceiling == 0 {
            return Err("validation.weekly_ceiling must be greater than zero".to_string());
        }
        if self.daily_floor > self.weekly_ceiling {
            return Err(
                "validation.daily_floor cannot exceed validation.weekly_ceiling".to_string(),
            );
        }
        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit entries
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/veil.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    fn validate(&self) -> Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Log rotation ("daily" or "hourly")
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_path() -> String {
    "./logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(format!("logging.level is not a valid level: {other}")),
        }
        match self.local_rotation.as_str() {
            "daily" | "hourly" => Ok(()),
            other => Err(format!("logging.local_rotation must be daily or hourly, got {other}")),
        }
    }
}
