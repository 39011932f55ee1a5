// src/registry/events.rs

//! Events emitted after successful registry mutations.

use crate::models::certificate::CertificateRecord;

/// A completed registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A new certificate was recorded.
    Issued(CertificateRecord),
    /// The certificate with this id was revoked.
    Revoked(u64),
}

/// Receives registry events once the mutation has been committed.
///
/// Errors are logged by the registry and never roll the mutation back.
///
/// Notification runs outside the store lock, so events from concurrent
/// mutations may arrive in a different order than they were committed.
/// Each committed mutation is delivered exactly once. Order issuance events
/// by `CertificateRecord::id` when commit order matters.
pub trait RegistryObserver: Send + Sync {
    fn on_event(&self, event: &RegistryEvent) -> anyhow::Result<()>;
}

/// Observer that writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl RegistryObserver for LogObserver {
    fn on_event(&self, event: &RegistryEvent) -> anyhow::Result<()> {
        match event {
            RegistryEvent::Issued(record) => log::info!(
                "Certificate {} issued to {} for {} (hash {})",
                record.id,
                record.participant_name,
                record.event_name,
                record.content_hash
            ),
            RegistryEvent::Revoked(id) => log::info!("Certificate {} revoked", id),
        }
        Ok(())
    }
}
