// src/services/api_server.rs
//! API Server for the Credential Registry
//!
//! This module provides the REST API through which client applications
//! (wallet UIs, relying parties, scripts) call into the registry.
//!
//! The API is built using Axum and includes endpoints for:
//! - Fingerprint computation over (issuer, subject, claim)
//! - Credential issuance and revocation (authenticated)
//! - Credential verification and content re-verification
//! - Lookups by id, subject and issuer
//! - Incremental reads of the registry event log

use crate::contracts::content_binder;
use crate::contracts::credential_registry::{CredentialRegistry, IssueRequest};
use crate::errors::{ErrorKind, RegistryError};
use crate::models::credential::{CredentialId, Fingerprint, ValidityState};
use crate::models::event::EventRecord;
use crate::models::identity::Identity;
use crate::services::auth::{AuthError, CallerAuth};
use crate::services::credential_issuer::CredentialIssuer;
use crate::services::verifier::Verifier;
use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// API request and response structures

/// Request payload for computing a fingerprint
#[derive(Serialize, Deserialize)]
struct FingerprintRequest {
    issuer: String,
    subject: String,
    claim: String,
}

/// Response containing a computed fingerprint
#[derive(Serialize, Deserialize)]
struct FingerprintResponse {
    fingerprint: Fingerprint,
}

/// Request payload for issuing a credential with a precomputed fingerprint
#[derive(Serialize, Deserialize)]
struct IssueCredentialRequest {
    issuer: String,
    subject: String,
    fingerprint: Fingerprint,
    validity_seconds: i64,
}

/// Response for credential issuance operation
#[derive(Serialize, Deserialize)]
struct IssueCredentialResponse {
    credential_id: CredentialId,
}

/// Request payload for issuing a credential from a raw claim
#[derive(Serialize, Deserialize)]
struct IssueClaimRequest {
    subject: String,
    claim: String,
    validity_seconds: i64,
}

/// Response for claim issuance operation
#[derive(Serialize, Deserialize)]
struct IssueClaimResponse {
    credential_id: CredentialId,
    fingerprint: Fingerprint,
}

/// Request payload for revoking a credential
#[derive(Serialize, Deserialize)]
struct RevokeCredentialRequest {
    credential_id: CredentialId,
}

/// Response for credential revocation operation
#[derive(Serialize, Deserialize)]
struct RevokeCredentialResponse {
    credential_id: CredentialId,
    revoked: bool,
}

/// Request payload for verifying a credential
#[derive(Serialize, Deserialize)]
struct VerifyCredentialRequest {
    credential_id: CredentialId,
}

/// Response for credential verification operation
#[derive(Serialize, Deserialize)]
struct VerifyCredentialResponse {
    credential_id: CredentialId,
    state: ValidityState,
}

/// Request payload for checking a presented claim against a credential
#[derive(Serialize, Deserialize)]
struct VerifyContentRequest {
    credential_id: CredentialId,
    issuer: String,
    subject: String,
    claim: String,
}

/// Response listing credential ids
#[derive(Serialize, Deserialize)]
struct CredentialListResponse {
    credential_ids: Vec<CredentialId>,
}

/// Query string for subject lookups
#[derive(Serialize, Deserialize)]
struct LookupQuery {
    valid_only: Option<bool>,
}

/// Query string for event log reads
#[derive(Serialize, Deserialize)]
struct EventsQuery {
    since: Option<u64>,
}

/// Response containing registry events
#[derive(Serialize, Deserialize)]
struct EventsResponse {
    events: Vec<EventRecord>,
}

/// Body of every error response
#[derive(Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Failure of an API call.
enum ApiError {
    Auth(AuthError),
    Registry(RegistryError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Auth(err) => (StatusCode::UNAUTHORIZED, "Unauthenticated", err.to_string()),
            ApiError::Registry(err) => {
                let status = match (err.kind(), &err) {
                    (ErrorKind::Validation, _) => StatusCode::BAD_REQUEST,
                    (ErrorKind::Authorization, _) => StatusCode::FORBIDDEN,
                    (ErrorKind::State, RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
                    (ErrorKind::State, _) => StatusCode::CONFLICT,
                    (ErrorKind::Storage, _) => {
                        error!("Registry storage failure: {}", err);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.code(), err.to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Parses a subject address, reporting failures as `InvalidSubject`.
fn parse_subject(value: &str) -> Result<Identity, RegistryError> {
    Identity::parse(value).map_err(|_| RegistryError::InvalidSubject(value.to_string()))
}

/// API server state containing all service dependencies
#[derive(Clone)]
pub struct ApiServer {
    /// Service for issuing and revoking credentials
    credential_issuer: CredentialIssuer,

    /// Service for verifying credentials
    verifier: Verifier,

    /// Registry, for record and event reads
    registry: Arc<CredentialRegistry>,

    /// Bearer token validation for mutating endpoints
    auth: Arc<CallerAuth>,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `registry` - Shared credential registry
    /// * `auth` - Caller authentication
    pub fn new(registry: Arc<CredentialRegistry>, auth: CallerAuth) -> Self {
        ApiServer {
            credential_issuer: CredentialIssuer::new(registry.clone()),
            verifier: Verifier::new(registry.clone()),
            registry,
            auth: Arc::new(auth),
        }
    }

    /// Builds the router with all API routes
    pub fn router(&self) -> Router {
        Router::new()
            .route("/fingerprint", post(Self::fingerprint_handler))
            .route("/issue-credential", post(Self::issue_credential_handler))
            .route("/issue-claim", post(Self::issue_claim_handler))
            .route("/revoke-credential", post(Self::revoke_credential_handler))
            .route("/verify-credential", post(Self::verify_credential_handler))
            .route("/verify-content", post(Self::verify_content_handler))
            .route("/credentials/:id", get(Self::get_credential_handler))
            .route("/subjects/:subject/credentials", get(Self::subject_credentials_handler))
            .route("/issuers/:issuer/credentials", get(Self::issuer_credentials_handler))
            .route("/fingerprints/:fingerprint/credentials", get(Self::fingerprint_credentials_handler))
            .route("/events", get(Self::events_handler))
            .layer(CorsLayer::permissive())
            .with_state(Arc::new(self.clone()))
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("API server listening on http://{}", addr);
        axum::serve(listener, self.router()).await
    }

    // =====================
    // Content Binding
    // =====================

    /// Computes the fingerprint of (issuer, subject, claim)
    ///
    /// # Endpoint
    /// POST /fingerprint
    ///
    /// # Responses
    /// - 200 OK: Returns the fingerprint
    /// - 400 Bad Request: Malformed address or empty claim
    async fn fingerprint_handler(
        Json(payload): Json<FingerprintRequest>,
    ) -> Result<Json<FingerprintResponse>, ApiError> {
        let fingerprint = content_binder::fingerprint(&payload.issuer, &payload.subject, &payload.claim)?;
        Ok(Json(FingerprintResponse { fingerprint }))
    }

    // =====================
    // Issuance & Revocation
    // =====================

    /// Issues a credential for a precomputed fingerprint
    ///
    /// # Endpoint
    /// POST /issue-credential
    ///
    /// # Responses
    /// - 200 OK: Returns the new credential id
    /// - 400 Bad Request: Invalid subject or duration
    /// - 401 Unauthorized: Missing or invalid bearer token
    /// - 403 Forbidden: Issuer is not the authenticated caller
    async fn issue_credential_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<IssueCredentialRequest>,
    ) -> Result<Json<IssueCredentialResponse>, ApiError> {
        let caller = state.auth.authenticate(&headers)?;
        // An unparseable issuer can never be the caller
        let issuer = Identity::parse(&payload.issuer).map_err(|_| RegistryError::UnauthorizedIssuer {
            issuer: payload.issuer.clone(),
            caller: caller.to_string(),
        })?;
        let request = IssueRequest {
            issuer,
            subject: parse_subject(&payload.subject)?,
            fingerprint: payload.fingerprint,
            validity_seconds: payload.validity_seconds,
        };

        let credential_id = state.credential_issuer.issue(&caller, request)?;
        Ok(Json(IssueCredentialResponse { credential_id }))
    }

    /// Binds a raw claim to the caller and subject and issues it
    ///
    /// # Endpoint
    /// POST /issue-claim
    ///
    /// # Responses
    /// - 200 OK: Returns the new credential id and its fingerprint
    /// - 400 Bad Request: Invalid subject, empty claim or bad duration
    /// - 401 Unauthorized: Missing or invalid bearer token
    async fn issue_claim_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<IssueClaimRequest>,
    ) -> Result<Json<IssueClaimResponse>, ApiError> {
        let caller = state.auth.authenticate(&headers)?;
        let subject = parse_subject(&payload.subject)?;

        let issued = state
            .credential_issuer
            .issue_claim(&caller, &subject, &payload.claim, payload.validity_seconds)?;
        Ok(Json(IssueClaimResponse {
            credential_id: issued.id,
            fingerprint: issued.fingerprint,
        }))
    }

    /// Revokes a credential
    ///
    /// # Endpoint
    /// POST /revoke-credential
    ///
    /// # Responses
    /// - 200 OK: Credential revoked
    /// - 401 Unauthorized: Missing or invalid bearer token
    /// - 403 Forbidden: Caller is not the issuer
    /// - 404 Not Found: Unknown credential
    /// - 409 Conflict: Credential already revoked
    async fn revoke_credential_handler(
        State(state): State<Arc<ApiServer>>,
        headers: HeaderMap,
        Json(payload): Json<RevokeCredentialRequest>,
    ) -> Result<Json<RevokeCredentialResponse>, ApiError> {
        let caller = state.auth.authenticate(&headers)?;
        state.credential_issuer.revoke(&caller, payload.credential_id)?;
        Ok(Json(RevokeCredentialResponse {
            credential_id: payload.credential_id,
            revoked: true,
        }))
    }

    // =====================
    // Verification
    // =====================

    /// Reports a credential's validity state
    ///
    /// # Endpoint
    /// POST /verify-credential
    ///
    /// # Responses
    /// - 200 OK: Returns Valid, Expired, Revoked or NotFound
    async fn verify_credential_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<VerifyCredentialRequest>,
    ) -> Json<VerifyCredentialResponse> {
        Json(VerifyCredentialResponse {
            credential_id: payload.credential_id,
            state: state.verifier.verify(payload.credential_id),
        })
    }

    /// Checks a presented claim against a credential's stored fingerprint
    ///
    /// # Endpoint
    /// POST /verify-content
    ///
    /// # Responses
    /// - 200 OK: Returns validity state and whether the content matches
    /// - 400 Bad Request: Malformed address or empty claim
    async fn verify_content_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<VerifyContentRequest>,
    ) -> Result<impl IntoResponse, ApiError> {
        let check = state.verifier.verify_content(
            payload.credential_id,
            &payload.issuer,
            &payload.subject,
            &payload.claim,
        )?;
        Ok(Json(check))
    }

    // =====================
    // Lookups
    // =====================

    /// Fetches a single credential record
    ///
    /// # Endpoint
    /// GET /credentials/:id
    async fn get_credential_handler(
        State(state): State<Arc<ApiServer>>,
        Path(id): Path<u64>,
    ) -> Result<impl IntoResponse, ApiError> {
        let id = CredentialId(id);
        let credential = state.registry.credential(id).ok_or(RegistryError::NotFound(id))?;
        Ok(Json(credential))
    }

    /// Lists credentials issued to a subject, in issuance order
    ///
    /// # Endpoint
    /// GET /subjects/:subject/credentials?valid_only=true
    ///
    /// Revoked and expired credentials are included unless `valid_only` is set.
    async fn subject_credentials_handler(
        State(state): State<Arc<ApiServer>>,
        Path(subject): Path<String>,
        Query(query): Query<LookupQuery>,
    ) -> Result<Json<CredentialListResponse>, ApiError> {
        let subject = parse_subject(&subject)?;
        let credential_ids = if query.valid_only.unwrap_or(false) {
            state.verifier.valid_credentials_for_subject(&subject)
        } else {
            state.verifier.credentials_for_subject(&subject)
        };
        Ok(Json(CredentialListResponse { credential_ids }))
    }

    /// Lists credentials issued by an issuer, in issuance order
    ///
    /// # Endpoint
    /// GET /issuers/:issuer/credentials
    async fn issuer_credentials_handler(
        State(state): State<Arc<ApiServer>>,
        Path(issuer): Path<String>,
    ) -> Result<Json<CredentialListResponse>, ApiError> {
        let issuer = Identity::parse(&issuer)?;
        Ok(Json(CredentialListResponse {
            credential_ids: state.verifier.credentials_for_issuer(&issuer),
        }))
    }

    /// Lists credentials carrying a fingerprint, for duplicate detection
    ///
    /// # Endpoint
    /// GET /fingerprints/:fingerprint/credentials
    async fn fingerprint_credentials_handler(
        State(state): State<Arc<ApiServer>>,
        Path(fingerprint): Path<Fingerprint>,
    ) -> Json<CredentialListResponse> {
        Json(CredentialListResponse {
            credential_ids: state.registry.credentials_for_fingerprint(&fingerprint),
        })
    }

    /// Reads the event log after a sequence number
    ///
    /// # Endpoint
    /// GET /events?since=N
    async fn events_handler(
        State(state): State<Arc<ApiServer>>,
        Query(query): Query<EventsQuery>,
    ) -> Json<EventsResponse> {
        Json(EventsResponse {
            events: state.registry.events_since(query.since.unwrap_or(0)),
        })
    }
}
