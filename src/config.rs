// src/config.rs
//! Service configuration.
//!
//! Settings come from `CERT_`-prefixed environment variables (a `.env` file
//! is loaded by `main` first). Example:
//!
//! ```text
//! CERT_BIND_ADDRESS=0.0.0.0:3000
//! CERT_BACKEND=contract
//! CERT_RPC_URL=https://sepolia.era.zksync.dev
//! CERT_PRIVATE_KEY=...
//! CERT_CONTRACT_ADDRESS=0x...
//! ```

use std::net::SocketAddr;

use anyhow::{bail, Context};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Which registry implementation the service runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process store, lost on restart
    Memory,
    /// Deployed `CertificateRegistry` contract
    Contract,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: SocketAddr,
    pub backend: BackendKind,
    /// Owner identity of the in-memory registry
    pub owner_identity: Option<String>,
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub contract_address: Option<String>,
    pub max_upload_bytes: u64,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_source(Environment::with_prefix("CERT"))
    }

    fn from_source(env: Environment) -> anyhow::Result<Self> {
        let settings: Settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("backend", "memory")?
            .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64)?
            .add_source(env)
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        match self.backend {
            BackendKind::Memory => {
                if self.owner_identity.as_deref().map_or(true, str::is_empty) {
                    bail!("CERT_OWNER_IDENTITY must be set for the memory backend");
                }
            }
            BackendKind::Contract => {
                for (name, value) in [
                    ("CERT_RPC_URL", &self.rpc_url),
                    ("CERT_PRIVATE_KEY", &self.private_key),
                    ("CERT_CONTRACT_ADDRESS", &self.contract_address),
                ] {
                    if value.as_deref().map_or(true, str::is_empty) {
                        bail!("{} must be set for the contract backend", name);
                    }
                }
            }
        }
        Ok(())
    }
}
