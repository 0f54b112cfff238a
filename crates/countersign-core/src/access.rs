//! Code classification and the signing gate.
//!
//! [`classify`] is pure: it maps a presented code to the capability it
//! unlocks, using an explicit ordered rule list so the tie-break policy is a
//! visible rule rather than accidental branch order. [`authorize`] then
//! decides whether that capability may sign given the document's current
//! state. Both run again server-side on the sign path against a freshly
//! loaded document — earlier verify responses are advisory only.

use countersign_storage::{Document, Party};

use crate::error::DocumentError;

/// The capability unlocked by a presented code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// May sign as party 1.
    Party1,
    /// May sign as party 2.
    Party2,
    /// Read-only access to content and both signatures.
    View,
}

impl From<Party> for Capability {
    fn from(party: Party) -> Self {
        match party {
            Party::Party1 => Self::Party1,
            Party::Party2 => Self::Party2,
        }
    }
}

/// What an authorized request is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// May record a signature into the given party's slot.
    Signer(Party),
    /// May read the full document, signatures included. Never reaches the
    /// commit path.
    ViewOnly,
}

/// Classify a presented code against the document's three stored codes.
///
/// Codes are checked in priority order party1 → party2 → view; the first
/// exact string match wins. In particular, when two stored codes are equal
/// (e.g. `party1_code == party2_code`), party1 wins — a documented policy,
/// not a defect. Comparison is verbatim: no normalization, no case folding,
/// no hashing at this layer.
#[must_use]
pub fn classify(document: &Document, presented: &str) -> Option<Capability> {
    let rules = [
        (document.party1_code.as_str(), Capability::Party1),
        (document.party2_code.as_str(), Capability::Party2),
        (document.view_code.as_str(), Capability::View),
    ];

    rules
        .into_iter()
        .find_map(|(code, capability)| (code == presented).then_some(capability))
}

/// Decide whether a classified capability may proceed against the document's
/// current signature state.
///
/// # Errors
///
/// Returns [`DocumentError::AlreadySigned`] when a party capability targets a
/// slot that is already occupied.
pub fn authorize(document: &Document, capability: Capability) -> Result<Grant, DocumentError> {
    match capability {
        Capability::Party1 => signer_grant(document, Party::Party1),
        Capability::Party2 => signer_grant(document, Party::Party2),
        Capability::View => Ok(Grant::ViewOnly),
    }
}

fn signer_grant(document: &Document, party: Party) -> Result<Grant, DocumentError> {
    if document.signature(party).is_some() {
        Err(DocumentError::AlreadySigned { party })
    } else {
        Ok(Grant::Signer(party))
    }
}
