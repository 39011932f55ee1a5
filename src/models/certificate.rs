// src/models/certificate.rs
//! Certificate data model.
//!
//! Defines the record kept by the certificate registry for each issued
//! certificate, and the three-way outcome reported when a certificate is
//! looked up for verification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A certificate recorded in the registry.
///
/// # Fields
/// - `id`: Sequential identifier, starting at 1 (0 is never issued)
/// - `participant_name`: Name of the certificate holder
/// - `event_name`: Event or course the certificate was issued for
/// - `content_hash`: Lowercase hex SHA-256 of the certificate file
/// - `issued_at`: Issuance time, immutable
/// - `is_valid`: `false` once the certificate has been revoked
///
/// # Serialization
/// Field names are serialized in camelCase to match the REST API payloads.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Registry-assigned identifier
    pub id: u64,

    /// Example: "Alice"
    pub participant_name: String,

    /// Example: "Contest2024"
    pub event_name: String,

    /// Hex digest of the artifact the certificate was issued for
    #[serde(rename = "certificateHash")]
    pub content_hash: String,

    pub issued_at: DateTime<Utc>,

    pub is_valid: bool,
}

/// Outcome of a verification lookup.
///
/// These are the only three states a certificate can be reported in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// No certificate with that hash or id exists.
    Unknown,
    /// The certificate exists but has been revoked.
    Revoked(CertificateRecord),
    /// The certificate exists and is valid.
    Valid(CertificateRecord),
}

impl Verification {
    /// Classifies an optional registry record.
    pub fn from_record(record: Option<CertificateRecord>) -> Self {
        match record {
            None => Verification::Unknown,
            Some(record) if record.is_valid => Verification::Valid(record),
            Some(record) => Verification::Revoked(record),
        }
    }

    pub fn exists(&self) -> bool {
        !matches!(self, Verification::Unknown)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid(_))
    }

    pub fn record(&self) -> Option<&CertificateRecord> {
        match self {
            Verification::Unknown => None,
            Verification::Revoked(record) | Verification::Valid(record) => Some(record),
        }
    }
}
