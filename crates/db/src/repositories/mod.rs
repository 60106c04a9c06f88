use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sitequote_core::domain::lead::{Lead, LeadId};

pub mod content;
pub mod lead;
pub mod memory;

pub use content::SqlContentStore;
pub use lead::SqlLeadRepository;
pub use memory::{InMemoryContentStore, InMemoryLeadRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// One schemaless document. `body_json` is kept as text so that malformed
/// bodies survive storage and are rejected by the reader instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub collection: String,
    pub id: String,
    pub body_json: String,
    pub position: i64,
    pub updated_at: DateTime<Utc>,
}

impl ContentDocument {
    pub fn new(
        collection: impl Into<String>,
        id: impl Into<String>,
        body: &serde_json::Value,
        position: i64,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            body_json: body.to_string(),
            position,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Documents of `collection` ordered by position, then id.
    async fn list_documents(&self, collection: &str)
        -> Result<Vec<ContentDocument>, RepositoryError>;
    async fn put_document(&self, document: ContentDocument) -> Result<(), RepositoryError>;
    async fn delete_collection(&self, collection: &str) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;
    async fn save(&self, lead: Lead) -> Result<(), RepositoryError>;
    /// Newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<Lead>, RepositoryError>;
}
