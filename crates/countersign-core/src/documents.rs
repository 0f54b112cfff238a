//! Document service — creation, listing, verification, and signing.
//!
//! Wraps a [`DocumentStore`] and carries all request-scoped state explicitly:
//! a presented code flows through [`classify`](crate::access::classify), the
//! resulting capability through the gate, and a signing submission into the
//! store's conditional update. Nothing is cached between requests.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use countersign_storage::{
    Document, DocumentStore, NewDocument, Party, SignOutcome, SignatureRecord,
};

use crate::access::{authorize, classify, Capability};
use crate::error::DocumentError;
use crate::status::SigningStatus;

/// Outcome of a successful code verification.
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    /// The code unlocked a party slot. Signature payloads are not exposed
    /// pre-signing; the caller renders names and content only.
    Party { party: Party, document: Document },
    /// The code unlocked read-only access to the full document, both
    /// signatures included.
    ViewOnly { document: Document },
}

/// Document operations over a shared store.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
}

impl DocumentService {
    /// Create a service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a document. All seven fields are required and non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::MissingField`] naming the first empty field,
    /// or [`DocumentError::Store`] on backend failure.
    pub async fn create(&self, doc: NewDocument) -> Result<Document, DocumentError> {
        let required = [
            ("title", doc.title.as_str()),
            ("content", doc.content.as_str()),
            ("party1_name", doc.party1_name.as_str()),
            ("party1_code", doc.party1_code.as_str()),
            ("party2_name", doc.party2_name.as_str()),
            ("party2_code", doc.party2_code.as_str()),
            ("view_code", doc.view_code.as_str()),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(DocumentError::MissingField { field });
            }
        }

        let document = self.store.insert(doc).await?;
        info!(id = %document.id, title = %document.title, "document created");
        Ok(document)
    }

    /// List all documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Store`] on backend failure.
    pub async fn list(&self) -> Result<Vec<Document>, DocumentError> {
        Ok(self.store.list().await?)
    }

    /// Fetch a document by id.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] for an unknown id.
    pub async fn get(&self, id: Uuid) -> Result<Document, DocumentError> {
        self.store.get(id).await?.ok_or(DocumentError::NotFound)
    }

    /// Delete a document unconditionally.
    ///
    /// Idempotent: deleting an id that does not exist (or was already
    /// deleted) still succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Store`] on backend failure.
    pub async fn delete(&self, id: Uuid) -> Result<(), DocumentError> {
        if self.store.delete(id).await? {
            info!(%id, "document deleted");
        }
        Ok(())
    }

    /// Classify a presented code against a document.
    ///
    /// Pure classification: an already-signed party still verifies
    /// successfully here — the gate rejects on the sign path, where it is
    /// re-evaluated against fresh state.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidCode`] when the code matches none of
    /// the three stored codes, [`DocumentError::NotFound`] for an unknown id.
    pub async fn verify(&self, id: Uuid, code: &str) -> Result<VerifyOutcome, DocumentError> {
        if code.is_empty() {
            return Err(DocumentError::MissingField { field: "code" });
        }

        let document = self.get(id).await?;
        match classify(&document, code) {
            Some(Capability::Party1) => Ok(VerifyOutcome::Party {
                party: Party::Party1,
                document,
            }),
            Some(Capability::Party2) => Ok(VerifyOutcome::Party {
                party: Party::Party2,
                document,
            }),
            Some(Capability::View) => Ok(VerifyOutcome::ViewOnly { document }),
            None => {
                warn!(%id, "verification code did not match");
                Err(DocumentError::InvalidCode)
            }
        }
    }

    /// Record a signature into a party's slot.
    ///
    /// The gate runs against a fresh read for an early rejection, but the
    /// store's conditional update is what guarantees at-most-one successful
    /// signature per slot when requests race. The timestamp is set here, at
    /// commit time — never client-supplied.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::AlreadySigned`] when the slot is occupied
    /// (including when a concurrent request won the race),
    /// [`DocumentError::NotFound`] for an unknown id,
    /// [`DocumentError::MissingField`] for an empty signature payload.
    pub async fn sign(
        &self,
        id: Uuid,
        party: Party,
        signature: String,
        full_name: Option<String>,
        ip: String,
    ) -> Result<Document, DocumentError> {
        if signature.is_empty() {
            return Err(DocumentError::MissingField { field: "signature" });
        }

        let document = self.get(id).await?;
        authorize(&document, Capability::from(party))?;

        let record = SignatureRecord {
            image: signature,
            full_name: full_name.unwrap_or_default(),
            signed_at: Utc::now(),
            ip,
        };

        match self.store.sign(id, party, record).await? {
            SignOutcome::Signed(updated) => {
                info!(
                    %id,
                    %party,
                    status = %SigningStatus::of(&updated),
                    "signature recorded"
                );
                Ok(updated)
            }
            SignOutcome::AlreadySigned => Err(DocumentError::AlreadySigned { party }),
            SignOutcome::NotFound => Err(DocumentError::NotFound),
        }
    }
}
