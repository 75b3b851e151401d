//! Vault persistence seam
//!
//! Optional collaborator that keeps tokens stable for a tenant across
//! sessions. When absent, the vault is purely in-memory and scoped to
//! one process lifetime. Encryption-at-rest is the store
//! implementation's concern.

use crate::domain::{Result, TenantId};
use crate::vault::VaultSnapshot;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persistence collaborator for vault snapshots, keyed by tenant
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Load the persisted snapshot for a tenant, if any
    async fn load(&self, tenant: &TenantId) -> Result<Option<VaultSnapshot>>;

    /// Persist a snapshot for a tenant, replacing any previous one
    async fn save(&self, tenant: &TenantId, snapshot: VaultSnapshot) -> Result<()>;
}

/// In-memory store, scoped to one process lifetime
#[derive(Default)]
pub struct InMemoryVaultStore {
    snapshots: RwLock<HashMap<TenantId, VaultSnapshot>>,
}

impl InMemoryVaultStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VaultStore for InMemoryVaultStore {
    async fn load(&self, tenant: &TenantId) -> Result<Option<VaultSnapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(tenant).cloned())
    }

    async fn save(&self, tenant: &TenantId, snapshot: VaultSnapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(tenant.clone(), snapshot);
        Ok(())
    }
}
