// src/registry/mod.rs

//! Certificate registry: store, owner guard, events and the backend boundary.

pub mod backend;
pub mod error;
pub mod events;
pub mod guard;
pub mod store;

pub use backend::{CertificateBackend, LocalRegistry};
pub use error::{RegistryError, Result};
pub use events::{LogObserver, RegistryEvent, RegistryObserver};
pub use store::CertificateStore;
