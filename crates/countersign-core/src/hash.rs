//! Code digests for the section-signature flow.
//!
//! The section flow never stores an unlock code in the clear — only its
//! SHA-256 hex digest. The document flow does NOT use this module: its codes
//! are compared verbatim by [`crate::access::classify`].

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a code.
#[must_use]
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

/// Check a code against a stored digest.
#[must_use]
pub fn verify_code(code: &str, digest: &str) -> bool {
    hash_code(code) == digest
}
