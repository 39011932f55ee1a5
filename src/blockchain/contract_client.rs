// src/blockchain/contract_client.rs
//! On-chain certificate registry client.
//!
//! Provides a [`CertificateBackend`] backed by a deployed `CertificateRegistry`
//! contract on an EVM chain, reached over JSON-RPC. Transactions are signed
//! with the service wallet; the contract itself enforces `onlyOwner`, and the
//! same checks are applied here first so that rejected calls never cost gas.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::{
    contract::{abigen, parse_log},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, Log, U256},
};

use crate::models::certificate::CertificateRecord;
use crate::registry::backend::CertificateBackend;
use crate::registry::error::{RegistryError, Result};
use crate::registry::guard::authorize;
use crate::registry::store::validate_certificate_fields;

abigen!(
    CertificateRegistryContract,
    r#"[
        function issueCertificate(string participantName, string eventName, string certificateHash) external returns (uint256)
        function verifyCertificateByHash(string certificateHash) external view returns (bool, bool, uint256, string, string, uint256)
        function getCertificate(uint256 certificateId) external view returns (uint256, string, string, string, uint256, bool)
        function revokeCertificate(uint256 certificateId) external
        function getTotalCertificates() external view returns (uint256)
        function owner() external view returns (address)
        event CertificateIssued(uint256 indexed certificateId, string participantName, string eventName, string certificateHash, uint256 issueDate)
        event CertificateRevoked(uint256 indexed certificateId)
    ]"#
);

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Certificate registry living in a smart contract.
///
/// Owner and signer identities are lowercase `0x`-prefixed hex addresses.
pub struct ContractRegistry<M> {
    /// Typed contract bindings over the client
    contract: CertificateRegistryContract<M>,
    /// Contract owner
    owner: String,
    /// Address of the wallet that signs transactions
    signer: String,
}

impl ContractRegistry<SignerClient> {
    /// Connects to the contract and reads its owner.
    ///
    /// # Arguments
    /// * `rpc_url` - JSON-RPC endpoint URL
    /// * `private_key` - Hex-encoded signing key (with or without 0x prefix)
    /// * `contract_address` - Address of the deployed registry
    ///
    /// # Errors
    /// Returns error if:
    /// - The RPC URL or contract address is malformed
    /// - The private key is invalid
    /// - The chain id or contract owner cannot be fetched
    pub async fn connect(
        rpc_url: &str,
        private_key: &str,
        contract_address: &str,
    ) -> anyhow::Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)?;
        let address: Address = contract_address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid contract address: {}", e))?;
        let wallet: LocalWallet = private_key.trim_start_matches("0x").parse()?;

        let chain_id = provider.get_chainid().await?.as_u64();
        let wallet = wallet.with_chain_id(chain_id);
        let signer = wallet.address();

        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let owner = CertificateRegistryContract::new(address, client.clone())
            .owner()
            .call()
            .await?;
        if owner != signer {
            log::warn!(
                "Signing wallet {} is not the registry owner; issue and revoke will be rejected",
                format_address(signer)
            );
        }

        Ok(Self::new(address, client, owner, signer))
    }
}

impl<M: Middleware> ContractRegistry<M> {
    /// Wraps an already configured client.
    ///
    /// `signer` is the address transactions are sent from; mutations are
    /// refused locally unless it equals `owner`.
    pub fn new(contract_address: Address, client: Arc<M>, owner: Address, signer: Address) -> Self {
        Self {
            contract: CertificateRegistryContract::new(contract_address, client),
            owner: format_address(owner),
            signer: format_address(signer),
        }
    }

    /// Owner check for both the requesting caller and the signing wallet.
    fn authorize(&self, caller: &str) -> Result<()> {
        authorize(caller, &self.owner)?;
        authorize(&self.signer, &self.owner)
    }
}

#[async_trait]
impl<M: Middleware + 'static> CertificateBackend for ContractRegistry<M> {
    async fn issue(
        &self,
        caller: &str,
        participant_name: &str,
        event_name: &str,
        content_hash: &str,
    ) -> Result<u64> {
        self.authorize(caller)?;
        validate_certificate_fields(participant_name, event_name, content_hash)?;
        if self.lookup_by_hash(content_hash).await?.is_some() {
            return Err(RegistryError::DuplicateHash(content_hash.to_string()));
        }

        let call = self.contract.issue_certificate(
            participant_name.to_string(),
            event_name.to_string(),
            content_hash.to_string(),
        );
        let pending = call.send().await.map_err(backend_error)?;
        let receipt = pending
            .await
            .map_err(backend_error)?
            .ok_or_else(|| RegistryError::Backend("issue transaction was dropped".into()))?;

        certificate_id_from_logs(receipt.logs)
    }

    async fn revoke(&self, caller: &str, id: u64) -> Result<()> {
        self.authorize(caller)?;
        match self.lookup_by_id(id).await? {
            None => return Err(RegistryError::NotFound(id)),
            Some(record) if !record.is_valid => return Err(RegistryError::AlreadyRevoked(id)),
            Some(_) => {}
        }

        let call = self.contract.revoke_certificate(U256::from(id));
        let pending = call.send().await.map_err(backend_error)?;
        pending
            .await
            .map_err(backend_error)?
            .ok_or_else(|| RegistryError::Backend("revoke transaction was dropped".into()))?;
        Ok(())
    }

    async fn lookup_by_hash(&self, content_hash: &str) -> Result<Option<CertificateRecord>> {
        let (exists, is_valid, id, participant_name, event_name, issue_date) = self
            .contract
            .verify_certificate_by_hash(content_hash.to_string())
            .call()
            .await
            .map_err(backend_error)?;

        if !exists {
            return Ok(None);
        }
        Ok(Some(CertificateRecord {
            id: to_u64(id)?,
            participant_name,
            event_name,
            content_hash: content_hash.to_string(),
            issued_at: to_timestamp(issue_date)?,
            is_valid,
        }))
    }

    async fn lookup_by_id(&self, id: u64) -> Result<Option<CertificateRecord>> {
        // The contract reverts on out-of-range ids rather than returning empty.
        if id == 0 || id > self.total().await? {
            return Ok(None);
        }

        let certificate = self
            .contract
            .get_certificate(U256::from(id))
            .call()
            .await
            .map_err(backend_error)?;
        record_from_tuple(certificate).map(Some)
    }

    async fn total(&self) -> Result<u64> {
        let total = self
            .contract
            .get_total_certificates()
            .call()
            .await
            .map_err(backend_error)?;
        to_u64(total)
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn name(&self) -> &'static str {
        "contract"
    }
}

/// Formats an address as lowercase hex with 0x prefix.
fn format_address(addr: Address) -> String {
    format!("0x{:x}", addr)
}

/// Reads the new certificate id from the `CertificateIssued` event in a receipt.
fn certificate_id_from_logs(logs: Vec<Log>) -> Result<u64> {
    logs.into_iter()
        .find_map(|log| parse_log::<CertificateIssuedFilter>(log).ok())
        .ok_or_else(|| RegistryError::Backend("receipt has no CertificateIssued event".into()))
        .and_then(|event| to_u64(event.certificate_id))
}

fn backend_error(e: impl std::fmt::Display) -> RegistryError {
    RegistryError::Backend(e.to_string())
}

fn to_u64(value: U256) -> Result<u64> {
    if value > U256::from(u64::MAX) {
        return Err(RegistryError::Backend(format!("value {} does not fit in u64", value)));
    }
    Ok(value.as_u64())
}

fn to_timestamp(seconds: U256) -> Result<DateTime<Utc>> {
    i64::try_from(to_u64(seconds)?)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| RegistryError::Backend(format!("invalid issue date {}", seconds)))
}

/// Converts the `getCertificate` return tuple into a record.
fn record_from_tuple(
    (id, participant_name, event_name, content_hash, issue_date, is_valid): (
        U256,
        String,
        String,
        String,
        U256,
        bool,
    ),
) -> Result<CertificateRecord> {
    Ok(CertificateRecord {
        id: to_u64(id)?,
        participant_name,
        event_name,
        content_hash,
        issued_at: to_timestamp(issue_date)?,
        is_valid,
    })
}
