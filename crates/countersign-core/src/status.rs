//! Document lifecycle status, derived on every read.
//!
//! Never stored: the status is a pure function of the two signature slots.
//! Transitions are monotonic — Unsigned → PartiallySigned → FullySigned —
//! because no operation ever clears a signature (write-once, enforced by the
//! store's conditional update).

use countersign_storage::Document;
use serde::Serialize;

/// Aggregate signing status of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningStatus {
    /// Both signature slots are empty.
    Unsigned,
    /// Exactly one party has signed.
    PartiallySigned,
    /// Both parties have signed. Terminal — no further mutation permitted.
    FullySigned,
}

impl SigningStatus {
    /// Derive the status from the document's signature slots.
    #[must_use]
    pub fn of(document: &Document) -> Self {
        match (
            document.party1_signature.is_some(),
            document.party2_signature.is_some(),
        ) {
            (false, false) => Self::Unsigned,
            (true, true) => Self::FullySigned,
            _ => Self::PartiallySigned,
        }
    }
}

impl std::fmt::Display for SigningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsigned => write!(f, "unsigned"),
            Self::PartiallySigned => write!(f, "partially_signed"),
            Self::FullySigned => write!(f, "fully_signed"),
        }
    }
}
