use std::collections::HashMap;

use tokio::sync::RwLock;

use sitequote_core::domain::lead::{Lead, LeadId};

use super::{ContentDocument, ContentStore, LeadRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryContentStore {
    documents: RwLock<HashMap<(String, String), ContentDocument>>,
}

#[async_trait::async_trait]
impl ContentStore for InMemoryContentStore {
    async fn list_documents(
        &self,
        collection: &str,
    ) -> Result<Vec<ContentDocument>, RepositoryError> {
        let documents = self.documents.read().await;
        let mut listed = documents
            .values()
            .filter(|document| document.collection == collection)
            .cloned()
            .collect::<Vec<_>>();
        listed.sort_by(|left, right| {
            left.position.cmp(&right.position).then_with(|| left.id.cmp(&right.id))
        });
        Ok(listed)
    }

    async fn put_document(&self, document: ContentDocument) -> Result<(), RepositoryError> {
        let mut documents = self.documents.write().await;
        documents.insert((document.collection.clone(), document.id.clone()), document);
        Ok(())
    }

    async fn delete_collection(&self, collection: &str) -> Result<u64, RepositoryError> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|(owner, _), _| owner != collection);
        Ok((before - documents.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryLeadRepository {
    leads: RwLock<HashMap<String, Lead>>,
}

#[async_trait::async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn find_by_id(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let leads = self.leads.read().await;
        Ok(leads.get(&id.0).cloned())
    }

    async fn save(&self, lead: Lead) -> Result<(), RepositoryError> {
        let mut leads = self.leads.write().await;
        leads.insert(lead.id.0.clone(), lead);
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Lead>, RepositoryError> {
        let leads = self.leads.read().await;
        let mut recent = leads.values().cloned().collect::<Vec<_>>();
        recent.sort_by(|left, right| {
            right.submitted_at.cmp(&left.submitted_at).then_with(|| right.id.0.cmp(&left.id.0))
        });
        recent.truncate(limit as usize);
        Ok(recent)
    }
}
