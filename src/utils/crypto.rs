// src/utils/crypto.rs
//! Content hashing for uploaded certificate artifacts.
//!
//! The hex digest produced here is the uniqueness key and lookup key of the
//! certificate registry, so it must stay stable across releases.

use ethers::utils::hex;
use ring::digest::{digest, SHA256};

/// Computes the SHA-256 digest of an artifact and encodes it as lowercase hex.
///
/// # Arguments
/// * `data` - Raw bytes of the uploaded file
///
/// # Returns
/// 64-character lowercase hex string. Byte-identical input always yields the
/// same string.
///
/// # Example
/// ```
/// use cert_registry::utils::crypto::hash_content;
///
/// let hash = hash_content(b"hello world");
/// assert_eq!(hash, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
/// ```
pub fn hash_content(data: &[u8]) -> String {
    hex::encode(digest(&SHA256, data).as_ref())
}
