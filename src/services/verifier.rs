// src/services/verifier.rs
//! Certificate verification service.
//!
//! Looks certificates up in the registry and reports one of three outcomes:
//! unknown, revoked or valid.

use std::sync::Arc;

use crate::models::certificate::Verification;
use crate::registry::backend::CertificateBackend;
use crate::registry::error::Result;
use crate::utils::crypto::hash_content;

/// Read-only certificate verifier.
#[derive(Clone)]
pub struct Verifier {
    backend: Arc<dyn CertificateBackend>,
}

impl Verifier {
    pub fn new(backend: Arc<dyn CertificateBackend>) -> Self {
        Self { backend }
    }

    /// Verifies the certificate issued for `content_hash`.
    ///
    /// # Returns
    /// - `Ok(Verification::Unknown)` if no certificate has this hash
    /// - `Ok(Verification::Revoked(_))` / `Ok(Verification::Valid(_))` otherwise
    /// - `Err` only if the registry backend fails
    pub async fn verify_by_hash(&self, content_hash: &str) -> Result<Verification> {
        let record = self.backend.lookup_by_hash(content_hash).await?;
        Ok(Verification::from_record(record))
    }

    /// Verifies the certificate with `id`. Id 0 is always unknown.
    pub async fn verify_by_id(&self, id: u64) -> Result<Verification> {
        if id == 0 {
            return Ok(Verification::Unknown);
        }
        let record = self.backend.lookup_by_id(id).await?;
        Ok(Verification::from_record(record))
    }

    /// Hashes `file` and verifies the resulting hash.
    pub async fn verify_file(&self, file: &[u8]) -> Result<Verification> {
        self.verify_by_hash(&hash_content(file)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::backend::LocalRegistry;
    use crate::registry::store::CertificateStore;

    const HASH_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1111";

    fn verifier() -> (Verifier, Arc<CertificateStore>) {
        let store = Arc::new(CertificateStore::new());
        let backend = Arc::new(LocalRegistry::new(store.clone(), "owner"));
        (Verifier::new(backend), store)
    }

    #[tokio::test]
    async fn test_three_outcomes() {
        let (verifier, store) = verifier();

        assert_eq!(verifier.verify_by_hash(HASH_A).await.unwrap(), Verification::Unknown);

        store.issue("Alice", "Contest2024", HASH_A).unwrap();
        let valid = verifier.verify_by_hash(HASH_A).await.unwrap();
        assert!(valid.exists() && valid.is_valid());
        assert_eq!(valid.record().unwrap().id, 1);

        store.revoke(1).unwrap();
        let revoked = verifier.verify_by_id(1).await.unwrap();
        assert!(revoked.exists() && !revoked.is_valid());
    }

    #[tokio::test]
    async fn test_out_of_range_ids_unknown() {
        let (verifier, store) = verifier();
        store.issue("Alice", "Contest2024", HASH_A).unwrap();

        assert_eq!(verifier.verify_by_id(0).await.unwrap(), Verification::Unknown);
        assert_eq!(verifier.verify_by_id(2).await.unwrap(), Verification::Unknown);
    }

    #[tokio::test]
    async fn test_verify_file_hashes_content() {
        let (verifier, store) = verifier();
        let file = b"certificate bytes";
        store.issue("Alice", "Contest2024", &hash_content(file)).unwrap();

        assert!(verifier.verify_file(file).await.unwrap().is_valid());
        assert!(!verifier.verify_file(b"tampered bytes").await.unwrap().exists());
    }
}
