// src/blockchain/mod.rs

//! EVM chain integration.

pub mod contract_client;
