//! Section-signature routes.
//!
//! The standalone flow: verify a code for one of the two fixed sections
//! (returning its SHA-256 digest), then save the signature with that digest.
//! Each section accepts at most one signature, ever.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use countersign_storage::{SectionId, SectionSignature};

use crate::error::AppError;
use crate::routes::client_ip;
use crate::state::AppState;

/// Request body for verifying a section code.
#[derive(Debug, Deserialize)]
pub struct VerifySectionRequest {
    pub section_id: SectionId,
    #[serde(default)]
    pub code: String,
}

/// Response carrying the digest to use in the subsequent save.
#[derive(Debug, Serialize)]
pub struct VerifySectionResponse {
    pub success: bool,
    pub code_hash: String,
}

/// Request body for saving a section signature.
#[derive(Debug, Deserialize)]
pub struct SignSectionRequest {
    pub section_id: SectionId,
    #[serde(default)]
    pub code_hash: String,
    #[serde(default)]
    pub signature_data: String,
}

/// Response for a stored section signature.
#[derive(Debug, Serialize)]
pub struct SignSectionResponse {
    pub success: bool,
    pub signature: SectionSignature,
}

/// Build the sections router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sections/verify-code", post(verify_section_code))
        .route("/sections/sign", post(sign_section))
}

/// `POST /sections/verify-code` — check the section is open and digest the code.
async fn verify_section_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifySectionRequest>,
) -> Result<Json<VerifySectionResponse>, AppError> {
    let code_hash = state
        .sections
        .verify_code(body.section_id, &body.code)
        .await?;

    Ok(Json(VerifySectionResponse {
        success: true,
        code_hash,
    }))
}

/// `POST /sections/sign` — record the section's one permitted signature.
async fn sign_section(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SignSectionRequest>,
) -> Result<Json<SignSectionResponse>, AppError> {
    let ip = client_ip(&headers);
    let signature = state
        .sections
        .save(body.section_id, body.code_hash, body.signature_data, ip)
        .await?;

    Ok(Json(SignSectionResponse {
        success: true,
        signature,
    }))
}
