// src/services/api_server.rs
//! API Server for the certificate registry
//!
//! This module provides the REST API for issuing, revoking and verifying
//! certificates. Certificate files are uploaded as multipart form data and
//! identified by the SHA-256 hash of their content.
//!
//! The API is built using Axum and includes endpoints for:
//! - Certificate issuance from an uploaded file
//! - Verification by file, by content hash or by certificate id
//! - Revocation and registry statistics

use crate::models::certificate::{CertificateRecord, Verification};
use crate::registry::backend::CertificateBackend;
use crate::registry::error::RegistryError;
use crate::services::certificate_issuer::CertificateIssuer;
use crate::services::verifier::Verifier;
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Json, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Request header carrying the identity of the caller for mutating requests.
pub const CALLER_HEADER: &str = "x-caller-identity";

// API response structures

/// Response for certificate issuance
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueCertificateResponse {
    certificate_id: u64,
    certificate_hash: String,
    participant_name: String,
    event_name: String,
}

/// Response for certificate revocation
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevokeCertificateResponse {
    certificate_id: u64,
    revoked: bool,
}

/// Response for every verification endpoint
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCertificateResponse {
    exists: bool,
    is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate: Option<CertificateRecord>,
}

impl From<Verification> for VerifyCertificateResponse {
    fn from(verification: Verification) -> Self {
        Self {
            exists: verification.exists(),
            is_valid: verification.is_valid(),
            certificate: verification.record().cloned(),
        }
    }
}

/// Response containing the number of issued certificates
#[derive(Serialize, Deserialize)]
struct TotalCertificatesResponse {
    total: u64,
}

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    backend: String,
}

/// Error payload returned with every non-2xx status
#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Failure of a request, rendered as an [`ErrorResponse`]
enum ApiError {
    Registry(RegistryError),
    Upload(MultipartError),
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::Registry(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Upload(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Registry(e) => {
                let status = match &e {
                    RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
                    RegistryError::DuplicateHash(_) => StatusCode::CONFLICT,
                    RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                    RegistryError::AlreadyRevoked(_) => StatusCode::CONFLICT,
                    RegistryError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    RegistryError::Backend(_) => {
                        log::error!("Registry backend failure: {}", e);
                        StatusCode::BAD_GATEWAY
                    }
                };
                (status, e.kind().to_string(), e.to_string())
            }
            ApiError::Upload(e) => (e.status(), "invalid_upload".to_string(), e.body_text()),
        };

        (status, Json(ErrorResponse { error, message })).into_response()
    }
}

/// Fields of a multipart certificate upload
#[derive(Default)]
struct CertificateUpload {
    participant_name: Option<String>,
    event_name: Option<String>,
    file: Option<Vec<u8>>,
}

impl CertificateUpload {
    /// Collects the known fields; unknown fields are skipped.
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut upload = CertificateUpload::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().trim().to_string();
            match name.as_str() {
                "participantName" => {
                    upload.participant_name = Some(field.text().await?.trim().to_string())
                }
                "eventName" => upload.event_name = Some(field.text().await?.trim().to_string()),
                "certificate" => upload.file = Some(field.bytes().await?.to_vec()),
                _ => {}
            }
        }

        Ok(upload)
    }

    fn require_file(&mut self) -> Result<Vec<u8>, RegistryError> {
        self.file
            .take()
            .ok_or_else(|| RegistryError::Validation("certificate".into()))
    }
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Service for issuing and revoking certificates
    certificate_issuer: Arc<CertificateIssuer>,

    /// Service for verifying certificates
    verifier: Arc<Verifier>,

    /// Backend name, reported by the health endpoint
    backend_name: &'static str,

    /// Maximum accepted request body, in bytes
    max_upload_bytes: usize,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `backend` - Registry the certificates are recorded in
    /// * `max_upload_bytes` - Upper bound on request bodies
    pub fn new(backend: Arc<dyn CertificateBackend>, max_upload_bytes: usize) -> Self {
        ApiServer {
            certificate_issuer: Arc::new(CertificateIssuer::new(backend.clone())),
            verifier: Arc::new(Verifier::new(backend.clone())),
            backend_name: backend.name(),
            max_upload_bytes,
        }
    }

    /// Builds the router with all API routes
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(Self::health_handler))
            .route("/api/certificates/issue", post(Self::issue_certificate_handler))
            .route("/api/certificates/verify", post(Self::verify_file_handler))
            .route("/api/certificates/verify/:hash", get(Self::verify_hash_handler))
            .route("/api/certificates/total", get(Self::total_certificates_handler))
            .route("/api/certificates/:id", get(Self::get_certificate_handler))
            .route("/api/certificates/:id/revoke", post(Self::revoke_certificate_handler))
            .layer(DefaultBodyLimit::max(self.max_upload_bytes))
            .layer(CorsLayer::permissive())
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("API server running at http://{}", addr);

        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    /// Reports service status
    ///
    /// # Endpoint
    /// GET /health
    async fn health_handler(State(state): State<Arc<ApiServer>>) -> impl IntoResponse {
        Json(HealthResponse {
            status: "ok".into(),
            backend: state.backend_name.into(),
        })
    }

    // =====================
    // Issuance Handlers
    // =====================

    /// Issues a certificate for an uploaded file
    ///
    /// # Endpoint
    /// POST /api/certificates/issue
    ///
    /// # Request
    /// Multipart form with `participantName`, `eventName` and a `certificate`
    /// file; the caller identity in the `x-caller-identity` header.
    ///
    /// # Responses
    /// - 201 Created: Returns id and content hash
    /// - 400 Bad Request: Missing or empty field
    /// - 401 Unauthorized: Caller is not the registry owner
    /// - 409 Conflict: File was already issued
    /// - 502 Bad Gateway: Registry backend failed
    async fn issue_certificate_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        multipart: Multipart,
    ) -> Result<impl IntoResponse, ApiError> {
        let caller = caller_identity(&headers)?;
        let mut upload = CertificateUpload::read(multipart).await?;
        let file = upload.require_file()?;

        let issued = state
            .certificate_issuer
            .issue_certificate(
                caller,
                upload.participant_name.as_deref().unwrap_or_default(),
                upload.event_name.as_deref().unwrap_or_default(),
                &file,
            )
            .await?;

        Ok((
            StatusCode::CREATED,
            Json(IssueCertificateResponse {
                certificate_id: issued.id,
                certificate_hash: issued.content_hash,
                participant_name: issued.participant_name,
                event_name: issued.event_name,
            }),
        ))
    }

    /// Revokes a certificate
    ///
    /// # Endpoint
    /// POST /api/certificates/:id/revoke
    ///
    /// # Responses
    /// - 200 OK: Certificate revoked
    /// - 401 Unauthorized: Caller is not the registry owner
    /// - 404 Not Found: No certificate with this id
    /// - 409 Conflict: Certificate already revoked
    async fn revoke_certificate_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<String>,
        headers: HeaderMap,
    ) -> Result<impl IntoResponse, ApiError> {
        let caller = caller_identity(&headers)?;
        let id = parse_certificate_id(&id)?;

        state.certificate_issuer.revoke_certificate(caller, id).await?;

        Ok(Json(RevokeCertificateResponse {
            certificate_id: id,
            revoked: true,
        }))
    }

    // =====================
    // Verification Handlers
    // =====================

    /// Verifies an uploaded certificate file
    ///
    /// # Endpoint
    /// POST /api/certificates/verify
    ///
    /// # Responses
    /// - 200 OK: Verification result (unknown files report `exists: false`)
    /// - 400 Bad Request: No file uploaded
    async fn verify_file_handler(
        State(state): State<Arc<ApiServer>>,
        multipart: Multipart,
    ) -> Result<impl IntoResponse, ApiError> {
        let file = CertificateUpload::read(multipart).await?.require_file()?;
        let verification = state.verifier.verify_file(&file).await?;
        Ok(Json(VerifyCertificateResponse::from(verification)))
    }

    /// Verifies a certificate by content hash
    ///
    /// # Endpoint
    /// GET /api/certificates/verify/:hash
    async fn verify_hash_handler(
        State(state): State<Arc<ApiServer>>,
        Path(hash): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let verification = state.verifier.verify_by_hash(&hash).await?;
        Ok(Json(VerifyCertificateResponse::from(verification)))
    }

    /// Looks a certificate up by id
    ///
    /// # Endpoint
    /// GET /api/certificates/:id
    ///
    /// # Responses
    /// - 200 OK: Verification result (unissued ids report `exists: false`)
    /// - 400 Bad Request: Id is not a number
    async fn get_certificate_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<String>,
    ) -> Result<impl IntoResponse, ApiError> {
        let id = parse_certificate_id(&id)?;
        let verification = state.verifier.verify_by_id(id).await?;
        Ok(Json(VerifyCertificateResponse::from(verification)))
    }

    /// Returns the number of certificates ever issued
    ///
    /// # Endpoint
    /// GET /api/certificates/total
    async fn total_certificates_handler(
        State(state): State<Arc<ApiServer>>,
    ) -> Result<impl IntoResponse, ApiError> {
        let total = state.certificate_issuer.total_certificates().await?;
        Ok(Json(TotalCertificatesResponse { total }))
    }
}

/// Reads the caller identity header. A missing or non-UTF-8 header is
/// treated as an anonymous caller and rejected by the owner guard.
fn caller_identity(headers: &HeaderMap) -> Result<&str, RegistryError> {
    headers
        .get(CALLER_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| RegistryError::Unauthorized(String::new()))
}

fn parse_certificate_id(raw: &str) -> Result<u64, RegistryError> {
    raw.trim()
        .parse()
        .map_err(|_| RegistryError::Validation("numeric certificateId".into()))
}
