use serde::Deserialize;
use serde_json::Value;

use crate::catalog::ESTIMATOR_COLLECTION;
use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Starter estimator catalog, written into the `estimator_items` collection.
///
/// Loading is idempotent: documents are upserted by id, so re-running the
/// seed refreshes bodies and positions without duplicating rows.
pub struct CatalogSeed;

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub dataset_version: String,
    pub collection: String,
    pub documents: Vec<SeedDocument>,
}

#[derive(Debug, Deserialize)]
pub struct SeedDocument {
    pub id: String,
    pub position: i64,
    pub body: Value,
}

impl CatalogSeed {
    pub const JSON: &str = include_str!("../../../config/fixtures/estimator_catalog_seed.json");

    pub fn parse() -> Result<SeedFile, RepositoryError> {
        let seed = serde_json::from_str::<SeedFile>(Self::JSON)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        if seed.collection != ESTIMATOR_COLLECTION {
            return Err(RepositoryError::Decode(format!(
                "seed targets collection `{}`, expected `{ESTIMATOR_COLLECTION}`",
                seed.collection
            )));
        }
        Ok(seed)
    }

    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let seed = Self::parse()?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        let mut tx = pool.begin().await?;

        for document in &seed.documents {
            sqlx::query(
                "INSERT INTO content_document (collection, id, body_json, position, updated_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(collection, id) DO UPDATE SET
                     body_json = excluded.body_json,
                     position = excluded.position,
                     updated_at = excluded.updated_at",
            )
            .bind(&seed.collection)
            .bind(&document.id)
            .bind(document.body.to_string())
            .bind(document.position)
            .bind(&updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(SeedResult {
            dataset_version: seed.dataset_version,
            collection: seed.collection,
            documents_seeded: seed.documents.len(),
        })
    }

    /// Checks every seeded document is present with the seeded body.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let seed = Self::parse()?;
        let mut checks = Vec::with_capacity(seed.documents.len());

        for document in &seed.documents {
            let stored: Option<String> = sqlx::query_scalar(
                "SELECT body_json FROM content_document WHERE collection = ?1 AND id = ?2",
            )
            .bind(&seed.collection)
            .bind(&document.id)
            .fetch_optional(pool)
            .await?;

            let matches = match stored {
                Some(body_json) => serde_json::from_str::<Value>(&body_json)
                    .map(|body| body == document.body)
                    .unwrap_or(false),
                None => false,
            };
            checks.push((document.id.clone(), matches));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes seeded documents, leaving anything else in the collection.
    pub async fn clean(pool: &DbPool) -> Result<u64, RepositoryError> {
        let seed = Self::parse()?;
        let mut tx = pool.begin().await?;
        let mut removed = 0;

        for document in &seed.documents {
            removed += sqlx::query("DELETE FROM content_document WHERE collection = ? AND id = ?")
                .bind(&seed.collection)
                .bind(&document.id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        Ok(removed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedResult {
    pub dataset_version: String,
    pub collection: String,
    pub documents_seeded: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}

impl VerificationResult {
    pub fn failed_checks(&self) -> Vec<&str> {
        self.checks.iter().filter(|(_, ok)| !ok).map(|(name, _)| name.as_str()).collect()
    }
}
