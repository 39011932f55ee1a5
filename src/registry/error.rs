// src/registry/error.rs

//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur while issuing, revoking or looking up certificates.
///
/// Absence of a certificate on lookup is not an error; lookups return
/// `Option`. `NotFound` is only raised by `revoke`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A required field was missing or empty.
    #[error("{0} is required")]
    Validation(String),

    /// A certificate with this content hash was already issued.
    #[error("certificate with hash {0} already exists")]
    DuplicateHash(String),

    /// No certificate with this id.
    #[error("certificate {0} not found")]
    NotFound(u64),

    /// The certificate was already revoked.
    #[error("certificate {0} is already revoked")]
    AlreadyRevoked(u64),

    /// The caller is not the registry owner.
    #[error("caller {0:?} is not authorized to modify the registry")]
    Unauthorized(String),

    /// Storage or network collaborator failure.
    #[error("registry backend error: {0}")]
    Backend(String),
}

impl RegistryError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::Validation(_) => "validation_error",
            RegistryError::DuplicateHash(_) => "duplicate_hash",
            RegistryError::NotFound(_) => "not_found",
            RegistryError::AlreadyRevoked(_) => "already_revoked",
            RegistryError::Unauthorized(_) => "unauthorized",
            RegistryError::Backend(_) => "backend_error",
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
