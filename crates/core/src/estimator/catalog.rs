use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::{
    normalize_catalog, CatalogItem, CatalogItemError, ItemCategory, RawCatalogItem,
};

/// Where the active catalog came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrigin {
    Remote,
    Fallback,
}

impl CatalogOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

/// Provider state as seen by the estimator: still loading, or loaded with
/// whatever items the store produced (possibly none).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogLoad {
    Loading,
    Ready(Vec<CatalogItem>),
}

/// The catalog the estimator actually prices against.
///
/// Each category is sorted ascending by price; equal prices keep catalog
/// order. Never empty: an empty remote catalog resolves to the built-in
/// fallback.
/// Built only through [`ActiveCatalog::fallback`] or
/// [`ActiveCatalog::from_items`]: never empty, each partition sorted by price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActiveCatalog {
    origin: CatalogOrigin,
    project_types: Vec<CatalogItem>,
    features: Vec<CatalogItem>,
}

impl ActiveCatalog {
    pub fn fallback() -> Self {
        Self::partition(CatalogOrigin::Fallback, fallback_items())
    }

    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        if items.is_empty() {
            return Self::fallback();
        }
        Self::partition(CatalogOrigin::Remote, items)
    }

    /// `None` while the provider is still loading.
    pub fn resolve(load: CatalogLoad) -> Option<Self> {
        match load {
            CatalogLoad::Loading => None,
            CatalogLoad::Ready(items) => Some(Self::from_items(items)),
        }
    }

    fn partition(origin: CatalogOrigin, items: Vec<CatalogItem>) -> Self {
        let (mut project_types, mut features): (Vec<_>, Vec<_>) =
            items.into_iter().partition(|item| item.category == ItemCategory::ProjectType);
        project_types.sort_by(|left, right| left.price.cmp(&right.price));
        features.sort_by(|left, right| left.price.cmp(&right.price));
        Self { origin, project_types, features }
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    pub fn project_types(&self) -> &[CatalogItem] {
        &self.project_types
    }

    pub fn features(&self) -> &[CatalogItem] {
        &self.features
    }

    pub fn find_project_type(&self, id: &str) -> Option<&CatalogItem> {
        self.project_types.iter().find(|item| item.id.as_str() == id)
    }

    pub fn find_feature(&self, id: &str) -> Option<&CatalogItem> {
        self.features.iter().find(|item| item.id.as_str() == id)
    }

    pub fn len(&self) -> usize {
        self.project_types.len() + self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Built-in catalog used whenever the content store yields nothing.
pub fn fallback_items() -> Vec<CatalogItem> {
    use ItemCategory::{Feature, ProjectType};

    vec![
        CatalogItem::new("landing", "Landing Page", Decimal::from(1000), ProjectType, "layout"),
        CatalogItem::new(
            "corporate",
            "Corporate Website",
            Decimal::from(2500),
            ProjectType,
            "database",
        ),
        CatalogItem::new(
            "ecommerce",
            "E-Commerce Store",
            Decimal::from(5000),
            ProjectType,
            "shopping-cart",
        ),
        CatalogItem::new("webapp", "Custom Web App", Decimal::from(8000), ProjectType, "smartphone"),
        CatalogItem::new("auth", "User Login / Auth", Decimal::from(1000), Feature, "shield"),
        CatalogItem::new(
            "payment",
            "Payment Integration",
            Decimal::from(1500),
            Feature,
            "dollar-sign",
        ),
        CatalogItem::new("cms", "CMS (Admin Panel)", Decimal::from(2000), Feature, "database"),
        CatalogItem::new("seo", "Advanced SEO", Decimal::from(800), Feature, "zap"),
        CatalogItem::new("chat", "Chat Functionality", Decimal::from(1200), Feature, "layout"),
    ]
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogFetchError {
    #[error("catalog source unavailable: {0}")]
    Unavailable(String),
    #[error("catalog payload could not be decoded: {0}")]
    Decode(String),
}

/// Supplies raw catalog documents from some content store.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<RawCatalogItem>, CatalogFetchError>;
}

/// Outcome of loading the catalog through a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogLoadReport {
    pub catalog: ActiveCatalog,
    pub rejected: Vec<CatalogItemError>,
    pub fetch_error: Option<CatalogFetchError>,
}

/// Fetches and normalizes the catalog, substituting the fallback when the
/// provider fails or yields no usable items. Never returns an error.
pub async fn load_catalog<P>(provider: &P) -> CatalogLoadReport
where
    P: CatalogProvider + ?Sized,
{
    match provider.fetch_catalog().await {
        Ok(raw_items) => {
            let normalized = normalize_catalog(raw_items);
            CatalogLoadReport {
                catalog: ActiveCatalog::from_items(normalized.items),
                rejected: normalized.rejected,
                fetch_error: None,
            }
        }
        Err(error) => CatalogLoadReport {
            catalog: ActiveCatalog::fallback(),
            rejected: Vec::new(),
            fetch_error: Some(error),
        },
    }
}
