// src/registry/guard.rs

//! Owner-only access guard for registry mutations.

use crate::registry::error::{RegistryError, Result};

/// Checks that `caller` is the registry owner.
///
/// Comparison is exact; identities are not trimmed or case-folded.
///
/// # Errors
/// `RegistryError::Unauthorized` carrying the rejected caller identity.
pub fn authorize(caller: &str, owner: &str) -> Result<()> {
    if caller == owner {
        Ok(())
    } else {
        Err(RegistryError::Unauthorized(caller.to_string()))
    }
}
