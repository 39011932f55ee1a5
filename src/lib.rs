// src/lib.rs

//! # Certificate Registry
//!
//! Issues and verifies certificates by hashing the certificate file and
//! recording the hash in a registry, exposed through a REST API.
//!
//! ## Architecture Overview
//! 1. **Registry Layer**: `CertificateStore` with the owner guard, or the
//!    on-chain `ContractRegistry`, both behind `CertificateBackend`
//! 2. **Services Layer**: Issuance, verification and API endpoints
//! 3. **Utilities**: Content hashing of uploaded files

pub mod blockchain; // On-chain registry client
pub mod config; // Environment configuration
pub mod models; // Data structures
pub mod registry; // Certificate store, owner guard, backend trait
pub mod services; // Business logic and API
pub mod utils; // Helper functions
