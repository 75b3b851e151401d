//! # Veil - Privacy Boundary Pipeline
//!
//! Veil de-identifies healthcare-operations data before it reaches any
//! external reasoning service and safely re-attaches the service's
//! output to the original entities:
//!
//! **Scrub → Anonymize → Externalize → Hydrate → Validate**
//!
//! Before a client or staff record leaves the system boundary it is
//! irreversibly converted into opaque tokens; the external service's
//! token-keyed result is hydrated back through the same vault and then
//! re-checked against hard business constraints, because the external
//! party is untrusted to honor them.
//!
//! ## Architecture
//!
//! - [`domain`] - Identifier newtypes, the entity model and the error taxonomy
//! - [`scrub`] - Regex/rule-based free-text sanitization
//! - [`vault`] - Bidirectional real-ID ↔ token mapping and persistence seam
//! - [`anonymize`] - Entity batches → token payloads (tokens, tiers, cross-refs)
//! - [`boundary`] - External service seam, strict result schema, HTTP client
//! - [`hydrate`] - Token resolution and display-field re-attachment
//! - [`validate`] - Constraint re-checking on untrusted external output
//! - [`pipeline`] - Per-request orchestration
//! - [`notify`] / [`audit`] - Alerting and hashed audit trail collaborators
//! - [`config`] / [`logging`] - Configuration and structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veil::boundary::HttpBoundary;
//! use veil::config::load_config;
//! use veil::domain::{DisplayFields, Entity, EntityKind, RealId};
//! use veil::pipeline::PrivacyPipeline;
//! use veil::vault::IdentityVault;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("veil.toml")?;
//!     let boundary = HttpBoundary::new(&config.boundary)?;
//!     let pipeline = PrivacyPipeline::new(&config, boundary)?;
//!
//!     // One vault per request or session; never externalized.
//!     let vault = IdentityVault::new();
//!     let entities = vec![Entity::new(
//!         RealId::new("client-7841")?,
//!         EntityKind::Client,
//!         DisplayFields::named("Jane Doe"),
//!     )
//!     .with_sector("North")];
//!
//!     let outcome = pipeline.run(&vault, &entities).await?;
//!     println!(
//!         "{} hydrated record(s), {} violation(s)",
//!         outcome.hydrated.records.len(),
//!         outcome.report.violations.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Trust model
//!
//! The external boundary is assumed slow, failure-prone and
//! non-compliant. Responses are schema-checked immediately
//! ([`boundary::parse_external_result`]), unknown tokens drop only the
//! offending record, and hard limits are recomputed from scratch by the
//! [`validate::ConstraintValidator`]. Regex scrubbing is a
//! defense-in-depth layer, not a guarantee; fields whose masking cannot
//! be confirmed are omitted from the payload, and a final leak sweep
//! fails the request closed.

pub mod anonymize;
pub mod audit;
pub mod boundary;
pub mod config;
pub mod domain;
pub mod hydrate;
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod scrub;
pub mod validate;
pub mod vault;
