//! PostgreSQL document store.
//!
//! Feature-gated behind `postgres-backend`. Uses sqlx with the Tokio runtime
//! for fully async operations. The signature write is a single conditional
//! `UPDATE ... WHERE partyN_signature IS NULL RETURNING *`, so the write-once
//! invariant holds at the database regardless of request interleaving; the
//! section insert relies on a unique index plus `ON CONFLICT DO NOTHING` for
//! the same reason.

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Document, NewDocument, NewSectionSignature, Party, SectionId, SectionOutcome,
    SectionSignature, SignOutcome, SignatureRecord,
};
use crate::{DocumentStore, StoreError};

/// A [`DocumentStore`] backed by PostgreSQL.
///
/// Thread-safe via `PgPool`.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore").finish_non_exhaustive()
    }
}

impl PostgresStore {
    /// Connect to PostgreSQL and run the initial migration.
    ///
    /// Creates the `documents` and `section_signatures` tables if they do not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connect`] if the connection or migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connect {
                url: database_url.to_owned(),
                reason: e.to_string(),
            })?;

        for statement in [
            "CREATE TABLE IF NOT EXISTS documents (\
                id               UUID PRIMARY KEY, \
                title            TEXT NOT NULL, \
                content          TEXT NOT NULL, \
                party1_name      TEXT NOT NULL, \
                party2_name      TEXT NOT NULL, \
                party1_code      TEXT NOT NULL, \
                party2_code      TEXT NOT NULL, \
                view_code        TEXT NOT NULL, \
                party1_signature TEXT, \
                party2_signature TEXT, \
                party1_full_name TEXT, \
                party2_full_name TEXT, \
                party1_signed_at TIMESTAMPTZ, \
                party2_signed_at TIMESTAMPTZ, \
                party1_ip        TEXT, \
                party2_ip        TEXT, \
                created_at       TIMESTAMPTZ NOT NULL\
            )",
            "CREATE TABLE IF NOT EXISTS section_signatures (\
                id             UUID PRIMARY KEY, \
                section_id     TEXT NOT NULL UNIQUE, \
                code_hash      TEXT NOT NULL, \
                signature_data TEXT NOT NULL, \
                ip_address     TEXT NOT NULL, \
                is_signed      BOOLEAN NOT NULL, \
                created_at     TIMESTAMPTZ NOT NULL\
            )",
            "CREATE INDEX IF NOT EXISTS idx_documents_created_at \
             ON documents (created_at DESC)",
        ] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| StoreError::Connect {
                    url: database_url.to_owned(),
                    reason: format!("migration failed: {e}"),
                })?;
        }

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresStore {
    async fn insert(&self, doc: NewDocument) -> Result<Document, StoreError> {
        let document = sqlx::query_as::<_, Document>(
            r"INSERT INTO documents
                (id, title, content, party1_name, party2_name,
                 party1_code, party2_code, view_code, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
              RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&doc.title)
        .bind(&doc.content)
        .bind(&doc.party1_name)
        .bind(&doc.party2_name)
        .bind(&doc.party1_code)
        .bind(&doc.party2_code)
        .bind(&doc.view_code)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Write {
            reason: e.to_string(),
        })?;

        Ok(document)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Read {
                reason: e.to_string(),
            })
    }

    async fn list(&self) -> Result<Vec<Document>, StoreError> {
        sqlx::query_as::<_, Document>("SELECT * FROM documents ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::List {
                reason: e.to_string(),
            })
    }

    async fn sign(
        &self,
        id: Uuid,
        party: Party,
        record: SignatureRecord,
    ) -> Result<SignOutcome, StoreError> {
        let sql = match party {
            Party::Party1 => {
                r"UPDATE documents
                  SET party1_signature = $2, party1_full_name = $3,
                      party1_signed_at = $4, party1_ip = $5
                  WHERE id = $1 AND party1_signature IS NULL
                  RETURNING *"
            }
            Party::Party2 => {
                r"UPDATE documents
                  SET party2_signature = $2, party2_full_name = $3,
                      party2_signed_at = $4, party2_ip = $5
                  WHERE id = $1 AND party2_signature IS NULL
                  RETURNING *"
            }
        };

        let updated = sqlx::query_as::<_, Document>(sql)
            .bind(id)
            .bind(&record.image)
            .bind(&record.full_name)
            .bind(record.signed_at)
            .bind(&record.ip)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Write {
                reason: e.to_string(),
            })?;

        if let Some(document) = updated {
            debug!(%id, %party, "signature slot written");
            return Ok(SignOutcome::Signed(document));
        }

        // No row matched: either the slot was taken or the id is unknown.
        let exists: Option<bool> = sqlx::query_scalar("SELECT true FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Read {
                reason: e.to_string(),
            })?;

        if exists.is_some() {
            debug!(%id, %party, "signature slot already occupied, write skipped");
            Ok(SignOutcome::AlreadySigned)
        } else {
            Ok(SignOutcome::NotFound)
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Delete {
                reason: e.to_string(),
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn section_signature(
        &self,
        section: SectionId,
    ) -> Result<Option<SectionSignature>, StoreError> {
        sqlx::query_as::<_, SectionSignature>(
            "SELECT * FROM section_signatures WHERE section_id = $1",
        )
        .bind(section)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Read {
            reason: e.to_string(),
        })
    }

    async fn insert_section_signature(
        &self,
        sig: NewSectionSignature,
    ) -> Result<SectionOutcome, StoreError> {
        let inserted = sqlx::query_as::<_, SectionSignature>(
            r"INSERT INTO section_signatures
                (id, section_id, code_hash, signature_data, ip_address, is_signed, created_at)
              VALUES ($1, $2, $3, $4, $5, true, $6)
              ON CONFLICT (section_id) DO NOTHING
              RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(sig.section_id)
        .bind(&sig.code_hash)
        .bind(&sig.signature_data)
        .bind(&sig.ip_address)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Write {
            reason: e.to_string(),
        })?;

        match inserted {
            Some(record) => Ok(SectionOutcome::Inserted(record)),
            None => {
                debug!(section = %sig.section_id, "section already has a signature, insert skipped");
                Ok(SectionOutcome::AlreadySigned)
            }
        }
    }
}
