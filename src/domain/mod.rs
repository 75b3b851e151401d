//! Core domain types and models
//!
//! This module contains the domain layer: identifier newtypes, the
//! entity model with its sensitive/categorical field split, and the
//! error taxonomy.

pub mod entity;
pub mod errors;
pub mod ids;
pub mod result;

pub use entity::{AvailabilityWindow, CrossRef, DaySlot, DisplayFields, Entity, EntityKind};
pub use errors::{BoundaryError, VeilError};
pub use ids::{AnonymizedId, RealId, TenantId};
pub use result::Result;
