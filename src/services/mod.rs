// src/services/mod.rs

//! Business logic and HTTP API.

pub mod api_server;
pub mod certificate_issuer;
pub mod verifier;
