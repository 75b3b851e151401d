//! Domain entity model
//!
//! An [`Entity`] is the unit the pipeline de-identifies: a client or a
//! staff member with a hard split between sensitive fields (which must
//! never cross the external boundary) and categorical fields (which are
//! safe to externalize as-is).

use crate::domain::ids::RealId;
use serde::{Deserialize, Serialize};

/// Kind of a domain entity
///
/// The kind determines the token prefix used by the vault, preventing
/// cross-kind token collisions and allowing cheap kind checks on a token
/// without a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A client/patient record
    Client,
    /// A staff member record
    Staff,
}

impl EntityKind {
    /// Single-character prefix prepended to every token of this kind
    pub fn token_prefix(&self) -> char {
        match self {
            Self::Client => 'C',
            Self::Staff => 'S',
        }
    }

    /// Resolve a kind from a token prefix character
    pub fn from_token_prefix(c: char) -> Option<Self> {
        match c {
            'C' => Some(Self::Client),
            'S' => Some(Self::Staff),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Staff => "staff",
        }
    }
}

/// Sensitive display fields
///
/// These are re-attached during hydration and must never appear in a
/// token payload in any form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFields {
    /// Full name
    pub name: String,
    /// Street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl DisplayFields {
    /// Creates display fields with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            phone: None,
        }
    }

    /// Sets the street address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Coarse slot within a day for availability windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaySlot {
    Morning,
    Afternoon,
    Evening,
}

/// Availability window, externalized as-is (categorical, coarse)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// Day of week (0 = Monday .. 6 = Sunday)
    pub day: u8,
    /// Slot within the day
    pub slot: DaySlot,
}

/// Cross-reference to another entity by real ID
///
/// Cross-references (e.g. a client's excluded-staff list) are translated
/// element-wise to tokens by the anonymizer; the explicit kind lets the
/// vault mint a correctly prefixed token for referents it has not seen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossRef {
    /// Real ID of the referenced entity
    pub id: RealId,
    /// Kind of the referenced entity
    pub kind: EntityKind,
}

/// A domain entity (client or staff member)
///
/// Fields are grouped by sensitivity:
/// - `display` and `monetary_cents` are sensitive and never externalized
///   directly (the amount is bucketed into a tier first);
/// - `role`, `sector`, `condition_tags` and `availability` are
///   categorical and cross the boundary verbatim;
/// - `excluded` cross-references are translated to tokens;
/// - `notes` is free text and passes through the scrubber, fail-closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable internal identifier
    pub real_id: RealId,
    /// Entity kind
    pub kind: EntityKind,
    /// Sensitive display fields
    pub display: DisplayFields,
    /// Exact monetary amount in cents (budget or rate); sensitive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monetary_cents: Option<i64>,
    /// Role (e.g. "nurse", "coordinator")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Sector or region label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Condition tags (categorical)
    #[serde(default)]
    pub condition_tags: Vec<String>,
    /// Availability windows (categorical, coarse)
    #[serde(default)]
    pub availability: Vec<AvailabilityWindow>,
    /// Cross-references to excluded entities
    #[serde(default)]
    pub excluded: Vec<CrossRef>,
    /// Free-text notes; scrubbed before externalization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity {
    /// Creates a new entity with the minimum required fields
    pub fn new(real_id: RealId, kind: EntityKind, display: DisplayFields) -> Self {
        Self {
            real_id,
            kind,
            display,
            monetary_cents: None,
            role: None,
            sector: None,
            condition_tags: Vec::new(),
            availability: Vec::new(),
            excluded: Vec::new(),
            notes: None,
        }
    }

    /// Sets the exact monetary amount in cents
    pub fn with_monetary_cents(mut self, cents: i64) -> Self {
        self.monetary_cents = Some(cents);
        self
    }

    /// Sets the role
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Sets the sector
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// Adds a condition tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.condition_tags.push(tag.into());
        self
    }

    /// Adds an availability window
    pub fn with_availability(mut self, window: AvailabilityWindow) -> Self {
        self.availability.push(window);
        self
    }

    /// Adds a cross-reference to an excluded entity
    pub fn with_excluded(mut self, id: RealId, kind: EntityKind) -> Self {
        self.excluded.push(CrossRef { id, kind });
        self
    }

    /// Sets free-text notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
