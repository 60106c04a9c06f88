//! Catalog providers backed by the content stores the estimator can read:
//! the local `content_document` table or a JSON document served over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{info, warn};

use sitequote_core::config::{CatalogConfig, CatalogSourceKind};
use sitequote_core::domain::catalog::RawCatalogItem;
use sitequote_core::estimator::{
    load_catalog, ActiveCatalog, CatalogFetchError, CatalogLoadReport, CatalogProvider,
};

use crate::repositories::{ContentDocument, ContentStore, SqlContentStore};
use crate::DbPool;

/// Collection holding estimator catalog documents.
pub const ESTIMATOR_COLLECTION: &str = "estimator_items";

pub struct DocumentCatalogProvider<S> {
    store: S,
    collection: String,
}

impl<S> DocumentCatalogProvider<S>
where
    S: ContentStore,
{
    pub fn new(store: S) -> Self {
        Self { store, collection: ESTIMATOR_COLLECTION.to_string() }
    }

    pub fn with_collection(store: S, collection: impl Into<String>) -> Self {
        Self { store, collection: collection.into() }
    }
}

#[async_trait]
impl<S> CatalogProvider for DocumentCatalogProvider<S>
where
    S: ContentStore,
{
    async fn fetch_catalog(&self) -> Result<Vec<RawCatalogItem>, CatalogFetchError> {
        let documents = self
            .store
            .list_documents(&self.collection)
            .await
            .map_err(|error| CatalogFetchError::Unavailable(error.to_string()))?;
        Ok(documents.into_iter().map(raw_item_from_document).collect())
    }
}

/// The document id stands in for a missing body id. Bodies that are not
/// valid JSON become id-only items so normalization rejects them by id.
fn raw_item_from_document(document: ContentDocument) -> RawCatalogItem {
    match serde_json::from_str::<Value>(&document.body_json).map(RawCatalogItem::from_value) {
        Ok(mut item) => {
            if item.id.trim().is_empty() {
                item.id = document.id;
            }
            item
        }
        Err(error) => {
            warn!(
                event_name = "catalog.document_undecodable",
                collection = %document.collection,
                document_id = %document.id,
                error = %error,
                "catalog document body is not valid JSON"
            );
            RawCatalogItem { id: document.id, ..RawCatalogItem::default() }
        }
    }
}

pub struct RemoteCatalogProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<SecretString>,
}

impl RemoteCatalogProvider {
    pub fn new(
        url: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, CatalogFetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| CatalogFetchError::Unavailable(error.to_string()))?;
        Ok(Self { client, url: url.into(), api_key })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogFetchError> {
        let url = config.remote_url.clone().ok_or_else(|| {
            CatalogFetchError::Unavailable("catalog.remote_url is not configured".to_string())
        })?;
        Self::new(url, config.remote_api_key.clone(), Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl CatalogProvider for RemoteCatalogProvider {
    async fn fetch_catalog(&self) -> Result<Vec<RawCatalogItem>, CatalogFetchError> {
        let mut request = self.client.get(&self.url);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|error| CatalogFetchError::Unavailable(error.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogFetchError::Unavailable(format!(
                "{} responded with {status}",
                self.url
            )));
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|error| CatalogFetchError::Decode(error.to_string()))?;
        raw_items_from_payload(payload)
    }
}

/// Accepts either a bare array of items or an object with an `items` array.
fn raw_items_from_payload(payload: Value) -> Result<Vec<RawCatalogItem>, CatalogFetchError> {
    let entries = match payload {
        Value::Array(entries) => entries,
        Value::Object(mut object) => match object.remove("items") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(CatalogFetchError::Decode(
                    "expected an `items` array in the catalog payload".to_string(),
                ))
            }
        },
        other => {
            return Err(CatalogFetchError::Decode(format!(
                "expected a JSON array or object, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(entries
        .into_iter()
        .map(RawCatalogItem::from_value)
        .collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Loads the catalog from whichever source the configuration names and logs
/// the outcome. Never fails: every problem degrades to the fallback catalog.
pub async fn load_configured_catalog(config: &CatalogConfig, pool: &DbPool) -> CatalogLoadReport {
    let report = match config.source {
        CatalogSourceKind::Database => {
            load_catalog(&DocumentCatalogProvider::new(SqlContentStore::new(pool.clone()))).await
        }
        CatalogSourceKind::Remote => match RemoteCatalogProvider::from_config(config) {
            Ok(provider) => load_catalog(&provider).await,
            Err(error) => CatalogLoadReport {
                catalog: ActiveCatalog::fallback(),
                rejected: Vec::new(),
                fetch_error: Some(error),
            },
        },
        CatalogSourceKind::Fallback => CatalogLoadReport {
            catalog: ActiveCatalog::fallback(),
            rejected: Vec::new(),
            fetch_error: None,
        },
    };

    log_report(config.source, &report);
    report
}

fn log_report(source: CatalogSourceKind, report: &CatalogLoadReport) {
    if let Some(error) = &report.fetch_error {
        warn!(
            event_name = "catalog.fetch_failed",
            source = source.as_str(),
            error = %error,
            "catalog source failed; using fallback catalog"
        );
    }
    for rejection in &report.rejected {
        warn!(
            event_name = "catalog.item_rejected",
            source = source.as_str(),
            reason = %rejection,
            "catalog item rejected"
        );
    }
    info!(
        event_name = "catalog.loaded",
        source = source.as_str(),
        origin = report.catalog.origin().as_str(),
        project_types = report.catalog.project_types().len(),
        features = report.catalog.features().len(),
        rejected = report.rejected.len(),
        "catalog ready"
    );
}
