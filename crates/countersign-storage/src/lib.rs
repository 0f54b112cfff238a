//! Storage layer for Countersign.
//!
//! This crate defines the [`DocumentStore`] trait — the persistence contract
//! for signable documents and the standalone section-signature records. The
//! domain logic in `countersign-core` is written against this trait and never
//! touches a database driver directly.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStore`] — in-memory, for tests and local development
//! - [`PostgresStore`] — production backend via sqlx (feature `postgres-backend`)
//!
//! The one correctness-critical operation is [`DocumentStore::sign`]: it must
//! be an atomic compare-and-set on the party's null signature slot, so that
//! two racing sign requests for the same slot produce exactly one winner and
//! never a lost update.

mod error;
mod memory;
mod models;
#[cfg(feature = "postgres-backend")]
mod postgres;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use models::{
    Document, NewDocument, NewSectionSignature, Party, SectionId, SectionOutcome,
    SectionSignature, SignOutcome, SignatureRecord,
};
#[cfg(feature = "postgres-backend")]
pub use postgres::PostgresStore;

use uuid::Uuid;

/// Durable storage for documents and section signatures.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Insert a new document with all seven required fields in one write.
    ///
    /// The store assigns the id and creation timestamp. Both signature slots
    /// start null.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the underlying backend fails.
    async fn insert(&self, doc: NewDocument) -> Result<Document, StoreError>;

    /// Fetch a document by id. Returns `Ok(None)` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the underlying backend fails.
    async fn get(&self, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// List all documents, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::List`] if the underlying backend fails.
    async fn list(&self) -> Result<Vec<Document>, StoreError>;

    /// Record a signature into the given party's slot.
    ///
    /// This is a single conditional update: the write only applies while the
    /// slot is still null. The loser of a concurrent race observes
    /// [`SignOutcome::AlreadySigned`] — the winner's data is never
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the underlying backend fails.
    async fn sign(
        &self,
        id: Uuid,
        party: Party,
        record: SignatureRecord,
    ) -> Result<SignOutcome, StoreError>;

    /// Delete a document unconditionally. Returns whether a record existed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Delete`] if the underlying backend fails.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Fetch the signature recorded for a section, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] if the underlying backend fails.
    async fn section_signature(
        &self,
        section: SectionId,
    ) -> Result<Option<SectionSignature>, StoreError>;

    /// Insert a section signature if the section has none yet.
    ///
    /// Conditional insert — at most one signature record may ever exist per
    /// section. A second attempt observes [`SectionOutcome::AlreadySigned`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the underlying backend fails.
    async fn insert_section_signature(
        &self,
        sig: NewSectionSignature,
    ) -> Result<SectionOutcome, StoreError>;
}
