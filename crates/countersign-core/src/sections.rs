//! Section-signature service.
//!
//! A simpler flow that runs beside the document flow: each of the two fixed
//! sections accepts at most one signature, and the unlocking code is stored
//! only as a SHA-256 digest. Unlike the document flow there is no stored
//! code to compare against — verification checks the section is still open
//! and hands back the digest for the subsequent save.

use std::sync::Arc;

use tracing::info;

use countersign_storage::{
    DocumentStore, NewSectionSignature, SectionId, SectionOutcome, SectionSignature,
};

use crate::error::SectionError;
use crate::hash::hash_code;

/// Section-signature operations over a shared store.
#[derive(Clone)]
pub struct SectionService {
    store: Arc<dyn DocumentStore>,
}

impl SectionService {
    /// Create a service over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Verify a code for a section and return its digest.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError::AlreadySigned`] when the section already has
    /// its one permitted signature, [`SectionError::MissingField`] for an
    /// empty code.
    pub async fn verify_code(
        &self,
        section: SectionId,
        code: &str,
    ) -> Result<String, SectionError> {
        if code.is_empty() {
            return Err(SectionError::MissingField { field: "code" });
        }

        if self.store.section_signature(section).await?.is_some() {
            return Err(SectionError::AlreadySigned { section });
        }

        Ok(hash_code(code))
    }

    /// Record a section signature.
    ///
    /// Conditional insert — the loser of a race with another save observes
    /// [`SectionError::AlreadySigned`].
    ///
    /// # Errors
    ///
    /// Returns [`SectionError::AlreadySigned`] when a record already exists,
    /// [`SectionError::MissingField`] for empty payload fields.
    pub async fn save(
        &self,
        section: SectionId,
        code_hash: String,
        signature_data: String,
        ip: String,
    ) -> Result<SectionSignature, SectionError> {
        if code_hash.is_empty() {
            return Err(SectionError::MissingField { field: "code_hash" });
        }
        if signature_data.is_empty() {
            return Err(SectionError::MissingField {
                field: "signature_data",
            });
        }

        let outcome = self
            .store
            .insert_section_signature(NewSectionSignature {
                section_id: section,
                code_hash,
                signature_data,
                ip_address: ip,
            })
            .await?;

        match outcome {
            SectionOutcome::Inserted(record) => {
                info!(%section, "section signature recorded");
                Ok(record)
            }
            SectionOutcome::AlreadySigned => Err(SectionError::AlreadySigned { section }),
        }
    }
}
