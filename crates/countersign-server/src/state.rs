//! Shared application state.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the two services, which in turn share
//! one document store.

use countersign_core::{DocumentService, SectionService};

/// Shared application state passed to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Document CRUD, verification, and signing.
    pub documents: DocumentService,
    /// Section-signature flow.
    pub sections: SectionService,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
