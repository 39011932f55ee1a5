// src/registry/backend.rs

//! Registry backend boundary.
//!
//! Services talk to the registry through [`CertificateBackend`] so the same
//! issuance and verification code runs against the in-process store or the
//! on-chain contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::certificate::CertificateRecord;
use crate::registry::error::Result;
use crate::registry::guard::authorize;
use crate::registry::store::CertificateStore;

/// Certificate registry operations consumed by the service layer.
///
/// `issue` and `revoke` are owner-guarded: implementations reject callers
/// other than [`CertificateBackend::owner`] before touching any state.
#[async_trait]
pub trait CertificateBackend: Send + Sync {
    /// Records a certificate and returns its id.
    async fn issue(
        &self,
        caller: &str,
        participant_name: &str,
        event_name: &str,
        content_hash: &str,
    ) -> Result<u64>;

    /// Revokes the certificate with `id`.
    async fn revoke(&self, caller: &str, id: u64) -> Result<()>;

    /// `Ok(None)` when no certificate has this hash.
    async fn lookup_by_hash(&self, content_hash: &str) -> Result<Option<CertificateRecord>>;

    /// `Ok(None)` when `id` was never issued, including 0.
    async fn lookup_by_id(&self, id: u64) -> Result<Option<CertificateRecord>>;

    /// Number of certificates ever issued.
    async fn total(&self) -> Result<u64>;

    /// Identity allowed to issue and revoke.
    fn owner(&self) -> &str;

    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Owner-guarded in-memory registry.
pub struct LocalRegistry {
    store: Arc<CertificateStore>,
    owner: String,
}

impl LocalRegistry {
    pub fn new(store: Arc<CertificateStore>, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
        }
    }
}

#[async_trait]
impl CertificateBackend for LocalRegistry {
    async fn issue(
        &self,
        caller: &str,
        participant_name: &str,
        event_name: &str,
        content_hash: &str,
    ) -> Result<u64> {
        authorize(caller, &self.owner)?;
        self.store.issue(participant_name, event_name, content_hash)
    }

    async fn revoke(&self, caller: &str, id: u64) -> Result<()> {
        authorize(caller, &self.owner)?;
        self.store.revoke(id)
    }

    async fn lookup_by_hash(&self, content_hash: &str) -> Result<Option<CertificateRecord>> {
        Ok(self.store.lookup_by_hash(content_hash))
    }

    async fn lookup_by_id(&self, id: u64) -> Result<Option<CertificateRecord>> {
        Ok(self.store.lookup_by_id(id))
    }

    async fn total(&self) -> Result<u64> {
        Ok(self.store.total())
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
