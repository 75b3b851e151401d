//! Configuration management
//!
//! TOML-backed configuration with `${VAR}` substitution, `VEIL_*`
//! environment overrides and validation.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    AuditConfig, BoundaryConfig, Environment, LoggingConfig, ScrubConfig, ValidationConfig,
    VeilConfig,
};
pub use secret::{secret, SecretString, SecretValue};
