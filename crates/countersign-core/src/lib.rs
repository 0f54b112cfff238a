//! Core library for Countersign.
//!
//! Everything that decides *whether* a signature may be recorded lives here:
//!
//! - [`access`] — classifies a presented code against a document's three
//!   stored codes and gates signing attempts on the current signature state
//! - [`status`] — derives a document's lifecycle status from its two
//!   signature slots
//! - [`hash`] — SHA-256 digests for the section-signature flow
//! - [`documents`] / [`sections`] — the services that the HTTP layer calls,
//!   wrapping a [`countersign_storage::DocumentStore`]
//!
//! The HTTP layer in `countersign-server` holds no domain logic of its own.

pub mod access;
pub mod documents;
pub mod error;
pub mod hash;
pub mod sections;
pub mod status;

pub use access::{authorize, classify, Capability, Grant};
pub use documents::{DocumentService, VerifyOutcome};
pub use error::{DocumentError, SectionError};
pub use sections::SectionService;
pub use status::SigningStatus;
