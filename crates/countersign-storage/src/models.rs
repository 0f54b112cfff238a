//! Record types persisted by the document store.
//!
//! The three access codes on [`Document`] are secrets: they are compared
//! verbatim by the core layer and never serialized into a response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the two named signers of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Party1,
    Party2,
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Party1 => write!(f, "party1"),
            Self::Party2 => write!(f, "party2"),
        }
    }
}

/// A signable document with two party slots and a read-only view code.
///
/// The signature fields for each party are write-once: once non-null they are
/// never overwritten (enforced by [`crate::DocumentStore::sign`]).
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "postgres-backend", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub party1_name: String,
    pub party2_name: String,
    #[serde(skip)]
    pub party1_code: String,
    #[serde(skip)]
    pub party2_code: String,
    #[serde(skip)]
    pub view_code: String,
    pub party1_signature: Option<String>,
    pub party2_signature: Option<String>,
    pub party1_full_name: Option<String>,
    pub party2_full_name: Option<String>,
    pub party1_signed_at: Option<DateTime<Utc>>,
    pub party2_signed_at: Option<DateTime<Utc>>,
    pub party1_ip: Option<String>,
    pub party2_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// The signature image stored for the given party, if any.
    #[must_use]
    pub fn signature(&self, party: Party) -> Option<&str> {
        match party {
            Party::Party1 => self.party1_signature.as_deref(),
            Party::Party2 => self.party2_signature.as_deref(),
        }
    }

    /// The declared display name of the given party.
    #[must_use]
    pub fn party_name(&self, party: Party) -> &str {
        match party {
            Party::Party1 => &self.party1_name,
            Party::Party2 => &self.party2_name,
        }
    }
}

/// All fields required to create a document. Inserted atomically.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub party1_name: String,
    pub party1_code: String,
    pub party2_name: String,
    pub party2_code: String,
    pub view_code: String,
}

/// The fields written exactly once when a party signs.
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    /// Opaque signature image payload (e.g. a data URL from a canvas).
    pub image: String,
    /// Signer-declared name; empty string when not supplied.
    pub full_name: String,
    /// Commit-time timestamp, set server-side.
    pub signed_at: DateTime<Utc>,
    /// Origin address of the signing request.
    pub ip: String,
}

/// Result of a conditional signature write.
#[derive(Debug, Clone)]
pub enum SignOutcome {
    /// The slot was null and the write applied; carries the updated document.
    Signed(Document),
    /// The slot was already occupied — the write was not applied.
    AlreadySigned,
    /// No document with that id exists.
    NotFound,
}

/// One of the two fixed sections in the standalone section-signature flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres-backend", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres-backend",
    sqlx(type_name = "text", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Section1,
    Section2,
}

impl std::fmt::Display for SectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Section1 => write!(f, "section1"),
            Self::Section2 => write!(f, "section2"),
        }
    }
}

/// A recorded section signature. At most one exists per section.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "postgres-backend", derive(sqlx::FromRow))]
pub struct SectionSignature {
    pub id: Uuid,
    pub section_id: SectionId,
    /// SHA-256 hex digest of the code that unlocked the section.
    pub code_hash: String,
    pub signature_data: String,
    pub ip_address: String,
    pub is_signed: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a section signature.
#[derive(Debug, Clone)]
pub struct NewSectionSignature {
    pub section_id: SectionId,
    pub code_hash: String,
    pub signature_data: String,
    pub ip_address: String,
}

/// Result of a conditional section-signature insert.
#[derive(Debug, Clone)]
pub enum SectionOutcome {
    /// The section had no signature; carries the stored record.
    Inserted(SectionSignature),
    /// The section already has a signature — nothing was written.
    AlreadySigned,
}
