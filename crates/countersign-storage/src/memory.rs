//! In-memory document store for tests and local development.
//!
//! All data lives in maps behind a `tokio::sync::RwLock` and is lost when the
//! process exits. The conditional operations ([`DocumentStore::sign`] and
//! [`DocumentStore::insert_section_signature`]) perform their check and write
//! under a single write-lock acquisition, so the write-once guarantees hold
//! under concurrent requests exactly as they do for the SQL backend.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Document, NewDocument, NewSectionSignature, Party, SectionId, SectionOutcome,
    SectionSignature, SignOutcome, SignatureRecord,
};
use crate::{DocumentStore, StoreError};

/// An in-memory [`DocumentStore`].
///
/// Thread-safe and cheap to clone — clones share the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<Uuid, Document>>>,
    sections: Arc<RwLock<HashMap<SectionId, SectionSignature>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, doc: NewDocument) -> Result<Document, StoreError> {
        let document = Document {
            id: Uuid::new_v4(),
            title: doc.title,
            content: doc.content,
            party1_name: doc.party1_name,
            party2_name: doc.party2_name,
            party1_code: doc.party1_code,
            party2_code: doc.party2_code,
            view_code: doc.view_code,
            party1_signature: None,
            party2_signature: None,
            party1_full_name: None,
            party2_full_name: None,
            party1_signed_at: None,
            party2_signed_at: None,
            party1_ip: None,
            party2_ip: None,
            created_at: Utc::now(),
        };

        let mut documents = self.documents.write().await;
        documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents.read().await;
        let mut all: Vec<Document> = documents.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn sign(
        &self,
        id: Uuid,
        party: Party,
        record: SignatureRecord,
    ) -> Result<SignOutcome, StoreError> {
        // Check-and-set under one write lock — no interleaving possible.
        let mut documents = self.documents.write().await;
        let Some(doc) = documents.get_mut(&id) else {
            return Ok(SignOutcome::NotFound);
        };

        if doc.signature(party).is_some() {
            debug!(%id, %party, "signature slot already occupied, write skipped");
            return Ok(SignOutcome::AlreadySigned);
        }

        match party {
            Party::Party1 => {
                doc.party1_signature = Some(record.image);
                doc.party1_full_name = Some(record.full_name);
                doc.party1_signed_at = Some(record.signed_at);
                doc.party1_ip = Some(record.ip);
            }
            Party::Party2 => {
                doc.party2_signature = Some(record.image);
                doc.party2_full_name = Some(record.full_name);
                doc.party2_signed_at = Some(record.signed_at);
                doc.party2_ip = Some(record.ip);
            }
        }

        debug!(%id, %party, "signature slot written");
        Ok(SignOutcome::Signed(doc.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut documents = self.documents.write().await;
        Ok(documents.remove(&id).is_some())
    }

    async fn section_signature(
        &self,
        section: SectionId,
    ) -> Result<Option<SectionSignature>, StoreError> {
        let sections = self.sections.read().await;
        Ok(sections.get(&section).cloned())
    }

    async fn insert_section_signature(
        &self,
        sig: NewSectionSignature,
    ) -> Result<SectionOutcome, StoreError> {
        let mut sections = self.sections.write().await;
        if sections.contains_key(&sig.section_id) {
            debug!(section = %sig.section_id, "section already has a signature, insert skipped");
            return Ok(SectionOutcome::AlreadySigned);
        }

        let record = SectionSignature {
            id: Uuid::new_v4(),
            section_id: sig.section_id,
            code_hash: sig.code_hash,
            signature_data: sig.signature_data,
            ip_address: sig.ip_address,
            is_signed: true,
            created_at: Utc::now(),
        };
        sections.insert(record.section_id, record.clone());
        Ok(SectionOutcome::Inserted(record))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn lease_doc() -> NewDocument {
        NewDocument {
            title: "Lease".to_owned(),
            content: "Terms of the lease.".to_owned(),
            party1_name: "A".to_owned(),
            party1_code: "111".to_owned(),
            party2_name: "B".to_owned(),
            party2_code: "222".to_owned(),
            view_code: "999".to_owned(),
        }
    }

    fn record(image: &str) -> SignatureRecord {
        SignatureRecord {
            image: image.to_owned(),
            full_name: "Alice".to_owned(),
            signed_at: Utc::now(),
            ip: "203.0.113.7".to_owned(),
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let store = MemoryStore::new();
        let doc = store.insert(lease_doc()).await.unwrap();

        let fetched = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Lease");
        assert_eq!(fetched.party1_code, "111");
        assert!(fetched.party1_signature.is_none());
        assert!(fetched.party2_signature.is_none());
    }

    #[tokio::test]
    async fn get_unknown_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_orders_newest_first() {
        let store = MemoryStore::new();
        let first = store.insert(lease_doc()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.insert(lease_doc()).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[tokio::test]
    async fn sign_sets_all_slot_fields() {
        let store = MemoryStore::new();
        let doc = store.insert(lease_doc()).await.unwrap();

        let outcome = store.sign(doc.id, Party::Party1, record("<img>")).await.unwrap();
        let SignOutcome::Signed(updated) = outcome else {
            panic!("expected Signed outcome");
        };
        assert_eq!(updated.party1_signature.as_deref(), Some("<img>"));
        assert_eq!(updated.party1_full_name.as_deref(), Some("Alice"));
        assert!(updated.party1_signed_at.is_some());
        assert_eq!(updated.party1_ip.as_deref(), Some("203.0.113.7"));
        assert!(updated.party2_signature.is_none());
    }

    #[tokio::test]
    async fn second_sign_is_rejected_and_first_wins() {
        let store = MemoryStore::new();
        let doc = store.insert(lease_doc()).await.unwrap();

        store.sign(doc.id, Party::Party1, record("first")).await.unwrap();
        let second = store.sign(doc.id, Party::Party1, record("second")).await.unwrap();
        assert!(matches!(second, SignOutcome::AlreadySigned));

        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.party1_signature.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn parties_sign_independent_slots() {
        let store = MemoryStore::new();
        let doc = store.insert(lease_doc()).await.unwrap();

        store.sign(doc.id, Party::Party1, record("p1")).await.unwrap();
        let outcome = store.sign(doc.id, Party::Party2, record("p2")).await.unwrap();
        assert!(matches!(outcome, SignOutcome::Signed(_)));

        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.party1_signature.as_deref(), Some("p1"));
        assert_eq!(stored.party2_signature.as_deref(), Some("p2"));
    }

    #[tokio::test]
    async fn sign_unknown_document_is_not_found() {
        let store = MemoryStore::new();
        let outcome = store.sign(Uuid::new_v4(), Party::Party1, record("x")).await.unwrap();
        assert!(matches!(outcome, SignOutcome::NotFound));
    }

    #[tokio::test]
    async fn concurrent_signs_have_exactly_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let doc = store.insert(lease_doc()).await.unwrap();

        let a = {
            let store = Arc::clone(&store);
            let id = doc.id;
            tokio::spawn(async move { store.sign(id, Party::Party1, record("racer-a")).await })
        };
        let b = {
            let store = Arc::clone(&store);
            let id = doc.id;
            tokio::spawn(async move { store.sign(id, Party::Party1, record("racer-b")).await })
        };

        let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
        let winners = outcomes
            .iter()
            .filter(|o| matches!(o, SignOutcome::Signed(_)))
            .count();
        let losers = outcomes
            .iter()
            .filter(|o| matches!(o, SignOutcome::AlreadySigned))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(losers, 1);

        // Stored image is the winner's, not an interleaved mix.
        let stored = store.get(doc.id).await.unwrap().unwrap();
        let image = stored.party1_signature.unwrap();
        assert!(image == "racer-a" || image == "racer-b");
    }

    #[tokio::test]
    async fn delete_returns_whether_record_existed() {
        let store = MemoryStore::new();
        let doc = store.insert(lease_doc()).await.unwrap();

        assert!(store.delete(doc.id).await.unwrap());
        assert!(!store.delete(doc.id).await.unwrap());
        assert!(store.get(doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn section_insert_is_at_most_one() {
        let store = MemoryStore::new();
        let sig = NewSectionSignature {
            section_id: SectionId::Section1,
            code_hash: "abc123".to_owned(),
            signature_data: "<img>".to_owned(),
            ip_address: "unknown".to_owned(),
        };

        let first = store.insert_section_signature(sig.clone()).await.unwrap();
        let SectionOutcome::Inserted(stored) = first else {
            panic!("expected Inserted outcome");
        };
        assert!(stored.is_signed);

        let second = store.insert_section_signature(sig).await.unwrap();
        assert!(matches!(second, SectionOutcome::AlreadySigned));
    }

    #[tokio::test]
    async fn sections_are_independent() {
        let store = MemoryStore::new();
        for section in [SectionId::Section1, SectionId::Section2] {
            let outcome = store
                .insert_section_signature(NewSectionSignature {
                    section_id: section,
                    code_hash: "h".to_owned(),
                    signature_data: "s".to_owned(),
                    ip_address: "unknown".to_owned(),
                })
                .await
                .unwrap();
            assert!(matches!(outcome, SectionOutcome::Inserted(_)));
        }
    }
}
