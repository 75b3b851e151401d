//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through the pipeline.
//! `RealId` never crosses the external boundary; `AnonymizedId` is the
//! only identifier permitted in a token payload.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable internal identifier for a domain entity
///
/// A `RealId` must never appear in any payload that crosses the external
/// boundary. Translation to and from tokens is owned exclusively by the
/// [`IdentityVault`](crate::vault::IdentityVault).
///
/// # Examples
///
/// ```
/// use veil::domain::RealId;
///
/// let id = RealId::new("client-7841").unwrap();
/// assert_eq!(id.as_str(), "client-7841");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RealId(String);

impl RealId {
    /// Creates a new RealId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or whitespace-only
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Real ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RealId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for RealId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque token substituted for a [`RealId`] before externalization
///
/// Tokens are minted by the vault with a single-character kind prefix
/// (`C` for clients, `S` for staff) so the kind of a token is checkable
/// without a vault lookup.
///
/// # Examples
///
/// ```
/// use veil::domain::AnonymizedId;
///
/// let token = AnonymizedId::new("C4f9a2b7c").unwrap();
/// assert_eq!(token.kind_prefix(), Some('C'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnonymizedId(String);

impl AnonymizedId {
    /// Creates a new AnonymizedId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only
    pub fn new(token: impl Into<String>) -> Result<Self, String> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err("Anonymized ID cannot be empty".to_string());
        }
        Ok(Self(token))
    }

    /// Returns the token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the kind-prefix character of the token
    pub fn kind_prefix(&self) -> Option<char> {
        self.0.chars().next()
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AnonymizedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AnonymizedId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for AnonymizedId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Tenant (company) identifier used to key persisted vaults
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new TenantId from a string
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or whitespace-only
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Tenant ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
