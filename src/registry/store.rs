// src/registry/store.rs

//! In-memory certificate store.
//!
//! Holds every issued certificate, the content-hash index and the id counter
//! behind a single lock, so check-then-mutate sequences are atomic and
//! readers always see the index and the records in agreement.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::models::certificate::CertificateRecord;
use crate::registry::error::{RegistryError, Result};
use crate::registry::events::{RegistryEvent, RegistryObserver};

/// Certificate store with sequential ids and unique content hashes.
///
/// Thread-safe via `RwLock`. Mutations do not check the caller; see
/// [`crate::registry::backend::LocalRegistry`] for the owner-guarded wrapper.
pub struct CertificateStore {
    inner: RwLock<StoreInner>,
    observers: Vec<Arc<dyn RegistryObserver>>,
}

struct StoreInner {
    /// Records indexed by id.
    records: HashMap<u64, CertificateRecord>,

    /// content hash -> id.
    hash_index: HashMap<String, u64>,

    /// Id of the next certificate. Starts at 1; 0 is reserved.
    next_id: u64,
}

impl StoreInner {
    fn contains_id(&self, id: u64) -> bool {
        id >= 1 && id < self.next_id
    }
}

impl CertificateStore {
    /// Creates an empty store whose first certificate gets id 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                records: HashMap::new(),
                hash_index: HashMap::new(),
                next_id: 1,
            }),
            observers: Vec::new(),
        }
    }

    /// Registers an observer notified after each successful mutation.
    pub fn with_observer(mut self, observer: Arc<dyn RegistryObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    // A panic while holding the lock cannot leave the maps half-written:
    // every mutation below is a sequence of infallible inserts.
    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a new certificate and returns its id.
    ///
    /// # Errors
    /// - `Validation` if any field is empty
    /// - `DuplicateHash` if `content_hash` was already issued
    ///
    /// State is unchanged on error.
    pub fn issue(&self, participant_name: &str, event_name: &str, content_hash: &str) -> Result<u64> {
        validate_certificate_fields(participant_name, event_name, content_hash)?;

        let record = {
            let mut inner = self.write();

            if inner.hash_index.contains_key(content_hash) {
                return Err(RegistryError::DuplicateHash(content_hash.to_string()));
            }

            let id = inner.next_id;
            let record = CertificateRecord {
                id,
                participant_name: participant_name.to_string(),
                event_name: event_name.to_string(),
                content_hash: content_hash.to_string(),
                issued_at: Utc::now(),
                is_valid: true,
            };

            inner.records.insert(id, record.clone());
            inner.hash_index.insert(content_hash.to_string(), id);
            inner.next_id += 1;
            record
        };

        let id = record.id;
        self.notify(RegistryEvent::Issued(record));
        Ok(id)
    }

    /// Finds the certificate issued for `content_hash`.
    pub fn lookup_by_hash(&self, content_hash: &str) -> Option<CertificateRecord> {
        let inner = self.read();
        inner
            .hash_index
            .get(content_hash)
            .and_then(|id| inner.records.get(id))
            .cloned()
    }

    /// Finds the certificate with `id`. Ids outside `1..next_id` are absent.
    pub fn lookup_by_id(&self, id: u64) -> Option<CertificateRecord> {
        let inner = self.read();
        if !inner.contains_id(id) {
            return None;
        }
        inner.records.get(&id).cloned()
    }

    /// Marks a certificate as revoked. Irreversible.
    ///
    /// # Errors
    /// - `NotFound` if `id` was never issued
    /// - `AlreadyRevoked` if the certificate is already invalid
    pub fn revoke(&self, id: u64) -> Result<()> {
        {
            let mut inner = self.write();
            if !inner.contains_id(id) {
                return Err(RegistryError::NotFound(id));
            }
            let record = inner
                .records
                .get_mut(&id)
                .ok_or(RegistryError::NotFound(id))?;
            if !record.is_valid {
                return Err(RegistryError::AlreadyRevoked(id));
            }
            record.is_valid = false;
        }

        self.notify(RegistryEvent::Revoked(id));
        Ok(())
    }

    /// Number of certificates ever issued, revoked ones included.
    pub fn total(&self) -> u64 {
        self.read().next_id - 1
    }

    fn notify(&self, event: RegistryEvent) {
        for observer in &self.observers {
            if let Err(e) = observer.on_event(&event) {
                log::warn!("Registry observer failed on {:?}: {}", event, e);
            }
        }
    }
}

impl Default for CertificateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejects empty certificate fields, in argument order.
pub fn validate_certificate_fields(
    participant_name: &str,
    event_name: &str,
    content_hash: &str,
) -> Result<()> {
    for (name, value) in [
        ("participantName", participant_name),
        ("eventName", event_name),
        ("certificateHash", content_hash),
    ] {
        if value.is_empty() {
            return Err(RegistryError::Validation(name.to_string()));
        }
    }
    Ok(())
}
