// src/main.rs

//! # Certificate Registry - Main Entry Point
//!
//! Loads configuration, builds the configured registry backend and starts
//! the API server.
//!
//! ## Environment Variables
//! - `CERT_BACKEND`: `memory` (default) or `contract`
//! - `CERT_OWNER_IDENTITY`: Owner of the in-memory registry
//! - `CERT_RPC_URL`, `CERT_PRIVATE_KEY`, `CERT_CONTRACT_ADDRESS`: Contract backend
//! - `CERT_BIND_ADDRESS`: (Optional) Listen address (default: 127.0.0.1:3000)
//! - `CERT_MAX_UPLOAD_BYTES`: (Optional) Upload size limit (default: 10 MiB)
//! - `RUST_LOG`: (Optional) Log filter (default: info)

use std::sync::Arc;

use anyhow::Context;
use cert_registry::blockchain::contract_client::ContractRegistry;
use cert_registry::config::{BackendKind, Settings};
use cert_registry::registry::{CertificateBackend, CertificateStore, LocalRegistry, LogObserver};
use cert_registry::services::api_server::ApiServer;
use dotenv::dotenv;

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Build the registry backend
/// 3. Start API server
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env()?;
    let backend = build_backend(&settings).await?;
    log::info!("Using {} registry", backend.name());

    let max_upload_bytes = usize::try_from(settings.max_upload_bytes)
        .context("CERT_MAX_UPLOAD_BYTES is too large for this platform")?;
    let api_server = ApiServer::new(backend, max_upload_bytes);

    log::info!("Available endpoints:");
    log::info!("- POST /api/certificates/issue");
    log::info!("- POST /api/certificates/verify");
    log::info!("- GET  /api/certificates/verify/:hash");
    log::info!("- GET  /api/certificates/:id");
    log::info!("- POST /api/certificates/:id/revoke");
    log::info!("- GET  /api/certificates/total");

    api_server.run(settings.bind_address).await
}

async fn build_backend(settings: &Settings) -> anyhow::Result<Arc<dyn CertificateBackend>> {
    match settings.backend {
        BackendKind::Memory => {
            let owner = settings.owner_identity.clone().unwrap_or_default();
            let store = CertificateStore::new().with_observer(Arc::new(LogObserver));
            Ok(Arc::new(LocalRegistry::new(Arc::new(store), owner)))
        }
        BackendKind::Contract => {
            let registry = ContractRegistry::connect(
                settings.rpc_url.as_deref().unwrap_or_default(),
                settings.private_key.as_deref().unwrap_or_default(),
                settings.contract_address.as_deref().unwrap_or_default(),
            )
            .await
            .context("Failed to connect to the certificate registry contract")?;
            Ok(Arc::new(registry))
        }
    }
}
