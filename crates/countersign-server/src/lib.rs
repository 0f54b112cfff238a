//! Countersign HTTP server.
//!
//! Wires the core services and a storage backend into a running Axum server
//! exposing the JSON API: document CRUD, code verification, party signing,
//! and the section-signature flow.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
