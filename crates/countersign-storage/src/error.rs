//! Storage error types.
//!
//! Every variant carries enough context to diagnose the failure without a
//! debugger. Callers in the core layer wrap these into domain errors.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to connect to the backend or run its initial migration.
    #[error("failed to connect to store at '{url}': {reason}")]
    Connect { url: String, reason: String },

    /// Failed to read a record.
    #[error("failed to read from store: {reason}")]
    Read { reason: String },

    /// Failed to write a record.
    #[error("failed to write to store: {reason}")]
    Write { reason: String },

    /// Failed to delete a record.
    #[error("failed to delete from store: {reason}")]
    Delete { reason: String },

    /// Failed to list records.
    #[error("failed to list store records: {reason}")]
    List { reason: String },
}
