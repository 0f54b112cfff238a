//! Domain error types.
//!
//! One enum per subsystem. The HTTP layer maps these onto status codes:
//! missing fields → 400, unknown ids → 404, write-once violations → 400,
//! classification misses → 401, storage failures → 500.

use countersign_storage::{Party, SectionId, StoreError};

/// Errors from the document flow.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// No document with the requested id exists.
    #[error("document not found")]
    NotFound,

    /// The party's signature slot is already occupied (write-once).
    #[error("{party} has already signed this document")]
    AlreadySigned { party: Party },

    /// The presented code matched none of the document's three codes.
    #[error("invalid verification code")]
    InvalidCode,

    /// A required request field was missing or empty.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the section-signature flow.
#[derive(Debug, thiserror::Error)]
pub enum SectionError {
    /// The section already has its one permitted signature.
    #[error("{section} is already signed")]
    AlreadySigned { section: SectionId },

    /// A required request field was missing or empty.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
