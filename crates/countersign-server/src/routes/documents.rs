//! Document routes — creation, listing, verification, signing, deletion.
//!
//! Request and response payloads are explicit structs per endpoint. Secret
//! codes never appear in any response body; a party-capability verify
//! response exposes names and content only, while a view-capability response
//! carries the full read-only bundle with both signatures.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use countersign_core::{DocumentError, SigningStatus, VerifyOutcome};
use countersign_storage::{Document, NewDocument, Party};

use crate::error::AppError;
use crate::routes::client_ip;
use crate::state::AppState;

/// Request body for creating a document. Every field is required non-empty.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub party1_name: String,
    #[serde(default)]
    pub party1_code: String,
    #[serde(default)]
    pub party2_name: String,
    #[serde(default)]
    pub party2_code: String,
    #[serde(default)]
    pub view_code: String,
}

/// Request body for verifying an access code.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub code: String,
}

/// Request body for recording a signature.
#[derive(Debug, Deserialize)]
pub struct SignRequest {
    pub party: Option<Party>,
    #[serde(default)]
    pub signature: String,
    pub full_name: Option<String>,
}

/// A full document plus its derived status.
#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub document: Document,
    pub status: SigningStatus,
}

/// Response for a successful signature commit.
#[derive(Debug, Serialize)]
pub struct SignResponse {
    pub success: bool,
    pub document: Document,
    pub status: SigningStatus,
}

/// Response for document deletion.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Summary row for the document listing — signature presence, not payloads.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub party1_name: String,
    pub party2_name: String,
    pub party1_signed: bool,
    pub party2_signed: bool,
    pub status: SigningStatus,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            created_at: doc.created_at,
            party1_name: doc.party1_name.clone(),
            party2_name: doc.party2_name.clone(),
            party1_signed: doc.party1_signature.is_some(),
            party2_signed: doc.party2_signature.is_some(),
            status: SigningStatus::of(doc),
        }
    }
}

/// Response for the document listing.
#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
}

/// Reduced document view for party-capability verify responses — the
/// signatures are not exposed pre-signing.
#[derive(Debug, Serialize)]
pub struct PartyDocumentView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub party1_name: String,
    pub party2_name: String,
}

impl From<&Document> for PartyDocumentView {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            content: doc.content.clone(),
            party1_name: doc.party1_name.clone(),
            party2_name: doc.party2_name.clone(),
        }
    }
}

/// Verify response for a party capability.
#[derive(Debug, Serialize)]
pub struct VerifyPartyResponse {
    pub valid: bool,
    pub party: Party,
    pub party_name: String,
    pub document: PartyDocumentView,
}

/// Verify response for the view capability — the full read-only bundle,
/// both signatures included, at any lifecycle stage.
#[derive(Debug, Serialize)]
pub struct VerifyViewResponse {
    pub valid: bool,
    pub view_only: bool,
    pub document: Document,
    pub status: SigningStatus,
}

/// Verify response when the code matched nothing.
#[derive(Debug, Serialize)]
pub struct VerifyInvalidResponse {
    pub valid: bool,
    pub error: &'static str,
}

/// Build the documents router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/documents", post(create_document).get(list_documents))
        .route(
            "/documents/{id}",
            get(get_document).delete(delete_document),
        )
        .route("/documents/{id}/verify", post(verify_document))
        .route("/documents/{id}/sign", post(sign_document))
}

/// `POST /documents` — create a document with all seven required fields.
async fn create_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateDocumentRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = state
        .documents
        .create(NewDocument {
            title: body.title,
            content: body.content,
            party1_name: body.party1_name,
            party1_code: body.party1_code,
            party2_name: body.party2_name,
            party2_code: body.party2_code,
            view_code: body.view_code,
        })
        .await?;

    let status = SigningStatus::of(&document);
    Ok(Json(DocumentResponse { document, status }))
}

/// `GET /documents` — list summaries, newest first.
///
/// A store failure on this read path degrades to an empty list with a
/// logged diagnostic; write paths never degrade silently.
async fn list_documents(State(state): State<Arc<AppState>>) -> Json<DocumentListResponse> {
    let documents = match state.documents.list().await {
        Ok(docs) => docs.iter().map(DocumentSummary::from).collect(),
        Err(err) => {
            tracing::error!(error = %err, "document listing failed, returning empty set");
            Vec::new()
        }
    };

    Json(DocumentListResponse { documents })
}

/// `GET /documents/{id}` — full document (codes omitted) or 404.
async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, AppError> {
    let document = state.documents.get(id).await?;
    let status = SigningStatus::of(&document);
    Ok(Json(DocumentResponse { document, status }))
}

/// `DELETE /documents/{id}` — unconditional, idempotent delete.
async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.documents.delete(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

/// `POST /documents/{id}/verify` — classify a presented code.
///
/// Classification here is advisory: the signing gate runs again on the sign
/// path against fresh state, so nothing from this response is trusted for
/// the actual write.
async fn verify_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<VerifyRequest>,
) -> Result<Response, AppError> {
    match state.documents.verify(id, &body.code).await {
        Ok(VerifyOutcome::Party { party, document }) => {
            let response = VerifyPartyResponse {
                valid: true,
                party,
                party_name: document.party_name(party).to_owned(),
                document: PartyDocumentView::from(&document),
            };
            Ok(Json(response).into_response())
        }
        Ok(VerifyOutcome::ViewOnly { document }) => {
            let status = SigningStatus::of(&document);
            let response = VerifyViewResponse {
                valid: true,
                view_only: true,
                document,
                status,
            };
            Ok(Json(response).into_response())
        }
        Err(DocumentError::InvalidCode) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(VerifyInvalidResponse {
                valid: false,
                error: "invalid verification code",
            }),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}

/// `POST /documents/{id}/sign` — record a signature into a party slot.
///
/// Re-validates not-already-signed server-side, independent of any earlier
/// verify step, and commits via the store's atomic conditional update.
async fn sign_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<SignRequest>,
) -> Result<Json<SignResponse>, AppError> {
    let Some(party) = body.party else {
        return Err(AppError::BadRequest(
            "missing required field 'party'".to_owned(),
        ));
    };

    let ip = client_ip(&headers);
    let document = state
        .documents
        .sign(id, party, body.signature, body.full_name, ip)
        .await?;

    let status = SigningStatus::of(&document);
    Ok(Json(SignResponse {
        success: true,
        document,
        status,
    }))
}
