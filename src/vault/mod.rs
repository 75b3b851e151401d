//! Identity vault
//!
//! Bidirectional mapping between real entity identifiers and opaque
//! anonymized tokens. The vault is the only component permitted to
//! perform the real-ID ↔ token translation; the anonymizer and the
//! hydrator both consult it and never construct tokens themselves.

pub mod store;

pub use store::{InMemoryVaultStore, VaultStore};

use crate::domain::{AnonymizedId, EntityKind, RealId, Result, VeilError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// Serializable state of a vault, used only by the persistence
/// collaborator. A snapshot must never be placed in any payload that
/// crosses the external boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultSnapshot {
    /// Forward mapping entries (real ID, kind, token)
    pub entries: Vec<(RealId, EntityKind, AnonymizedId)>,
}

#[derive(Debug, Default)]
struct VaultMaps {
    forward: HashMap<RealId, (EntityKind, AnonymizedId)>,
    reverse: HashMap<AnonymizedId, RealId>,
}

/// Request- or session-scoped token vault
///
/// Invariants:
/// - the `RealId ↔ AnonymizedId` mapping is a bijection within one
///   vault instance;
/// - tokens are stable for the lifetime of the instance: repeated
///   tokenization of the same real ID yields the same token;
/// - concurrent first-time mints for the same real ID resolve to a
///   single token (double-checked under the write lock).
///
/// # Thread Safety
///
/// All operations take `&self`; the vault can be shared across tasks
/// behind an `Arc`. Reads take a shared lock, mints take the exclusive
/// lock.
pub struct IdentityVault {
    maps: RwLock<VaultMaps>,
    rng: Mutex<StdRng>,
}

impl IdentityVault {
    /// Create an empty vault
    pub fn new() -> Self {
        Self {
            maps: RwLock::new(VaultMaps::default()),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Return the existing token for `real_id`, or mint a new one
    ///
    /// The token is prefixed by entity kind. Concurrent calls for the
    /// same real ID observe the same token: the fast path takes a read
    /// lock, and the mint path re-checks under the write lock before
    /// inserting.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::VaultCollision`] if the real ID was
    /// previously tokenized under a different kind, or if minting would
    /// break the bijection. Both indicate internal bugs and abort the
    /// request.
    pub fn token_for(&self, real_id: &RealId, kind: EntityKind) -> Result<AnonymizedId> {
        {
            let maps = self.maps.read().expect("vault lock poisoned");
            if let Some((existing_kind, token)) = maps.forward.get(real_id) {
                if *existing_kind != kind {
                    return Err(VeilError::VaultCollision {
                        token: token.to_string(),
                        existing: format!("{real_id} ({})", existing_kind.label()),
                        incoming: format!("{real_id} ({})", kind.label()),
                    });
                }
                return Ok(token.clone());
            }
        }

        let mut maps = self.maps.write().expect("vault lock poisoned");
        // Another caller may have minted while we waited for the lock.
        if let Some((_, token)) = maps.forward.get(real_id) {
            return Ok(token.clone());
        }

        let token = self.mint_token(kind, &maps)?;
        if let Some(previous) = maps.reverse.insert(token.clone(), real_id.clone()) {
            return Err(VeilError::VaultCollision {
                token: token.to_string(),
                existing: previous.to_string(),
                incoming: real_id.to_string(),
            });
        }
        maps.forward.insert(real_id.clone(), (kind, token.clone()));
        tracing::debug!(kind = kind.label(), "Minted anonymized token");
        Ok(token)
    }

    /// Reverse lookup: token → real ID
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::UnknownToken`] if this vault instance never
    /// issued the token.
    pub fn resolve(&self, token: &AnonymizedId) -> Result<RealId> {
        let maps = self.maps.read().expect("vault lock poisoned");
        maps.reverse
            .get(token)
            .cloned()
            .ok_or_else(|| VeilError::UnknownToken(token.to_string()))
    }

    /// Whether a real ID has been tokenized by this vault
    pub fn contains(&self, real_id: &RealId) -> bool {
        let maps = self.maps.read().expect("vault lock poisoned");
        maps.forward.contains_key(real_id)
    }

    /// Number of issued tokens
    pub fn len(&self) -> usize {
        let maps = self.maps.read().expect("vault lock poisoned");
        maps.forward.len()
    }

    /// Whether the vault has issued no tokens
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export the vault state for the persistence collaborator
    pub fn snapshot(&self) -> VaultSnapshot {
        let maps = self.maps.read().expect("vault lock poisoned");
        VaultSnapshot {
            entries: maps
                .forward
                .iter()
                .map(|(id, (kind, token))| (id.clone(), *kind, token.clone()))
                .collect(),
        }
    }

    /// Rebuild a vault from a persisted snapshot
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::VaultCollision`] if the snapshot does not
    /// describe a bijection.
    pub fn restore(snapshot: VaultSnapshot) -> Result<Self> {
        let vault = Self::new();
        {
            let mut maps = vault.maps.write().expect("vault lock poisoned");
            for (real_id, kind, token) in snapshot.entries {
                if let Some(previous) = maps.reverse.insert(token.clone(), real_id.clone()) {
                    return Err(VeilError::VaultCollision {
                        token: token.to_string(),
                        existing: previous.to_string(),
                        incoming: real_id.to_string(),
                    });
                }
                maps.forward.insert(real_id, (kind, token));
            }
        }
        Ok(vault)
    }

    /// Mint a fresh, kind-prefixed, collision-free token
    fn mint_token(&self, kind: EntityKind, maps: &VaultMaps) -> Result<AnonymizedId> {
        let mut rng = self.rng.lock().expect("vault rng poisoned");
        // 32 bits of entropy per attempt; regenerate on the (unlikely)
        // collision with an already-issued token.
        for _ in 0..64 {
            let suffix: u32 = rng.gen();
            let candidate = AnonymizedId::new(format!("{}{suffix:08x}", kind.token_prefix()))
                .map_err(VeilError::Other)?;
            if !maps.reverse.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        Err(VeilError::Other(
            "Token space exhausted while minting".to_string(),
        ))
    }
}

impl Default for IdentityVault {
    fn default() -> Self {
        Self::new()
    }
}
