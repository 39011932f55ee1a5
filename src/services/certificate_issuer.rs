// src/services/certificate_issuer.rs
//! Certificate Issuer Service
//!
//! Turns an uploaded certificate file into a registry entry: the file is
//! hashed, and the hash is recorded together with the participant and event
//! names. Also handles revocation.

use std::sync::Arc;

use crate::registry::backend::CertificateBackend;
use crate::registry::error::{RegistryError, Result};
use crate::utils::crypto::hash_content;

/// A certificate recorded by [`CertificateIssuer::issue_certificate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCertificate {
    pub id: u64,
    pub content_hash: String,
    pub participant_name: String,
    pub event_name: String,
}

/// Service for issuing and revoking certificates.
#[derive(Clone)]
pub struct CertificateIssuer {
    /// Registry the certificates are recorded in
    backend: Arc<dyn CertificateBackend>,
}

impl CertificateIssuer {
    pub fn new(backend: Arc<dyn CertificateBackend>) -> Self {
        Self { backend }
    }

    /// Hashes `file` and issues a certificate for it.
    ///
    /// # Arguments
    /// * `caller` - Identity of the requester; must be the registry owner
    /// * `participant_name` - Certificate holder
    /// * `event_name` - Event the certificate was awarded for
    /// * `file` - Raw bytes of the certificate artifact
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not the owner
    /// - `Validation` if a name is empty or the file has no content
    /// - `DuplicateHash` if the same file was already issued
    /// - `Backend` if the registry cannot be reached
    pub async fn issue_certificate(
        &self,
        caller: &str,
        participant_name: &str,
        event_name: &str,
        file: &[u8],
    ) -> Result<IssuedCertificate> {
        if file.is_empty() {
            return Err(RegistryError::Validation("certificate".into()));
        }

        let content_hash = hash_content(file);
        let id = self
            .backend
            .issue(caller, participant_name, event_name, &content_hash)
            .await
            .map_err(|e| log_rejection("issue", e))?;

        Ok(IssuedCertificate {
            id,
            content_hash,
            participant_name: participant_name.to_string(),
            event_name: event_name.to_string(),
        })
    }

    /// Revokes the certificate with `id`.
    pub async fn revoke_certificate(&self, caller: &str, id: u64) -> Result<()> {
        self.backend
            .revoke(caller, id)
            .await
            .map_err(|e| log_rejection("revoke", e))
    }

    /// Number of certificates ever issued.
    pub async fn total_certificates(&self) -> Result<u64> {
        self.backend.total().await
    }
}

fn log_rejection(operation: &str, error: RegistryError) -> RegistryError {
    if !matches!(error, RegistryError::Backend(_)) {
        log::warn!("Certificate {} rejected: {}", operation, error);
    }
    error
}
