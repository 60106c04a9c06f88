use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Icon used when a catalog document does not name one.
pub const DEFAULT_ICON: &str = "layout";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    ProjectType,
    Feature,
}

impl ItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectType => "project_type",
            Self::Feature => "feature",
        }
    }
}

impl FromStr for ItemCategory {
    type Err = CatalogItemError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "project_type" => Ok(Self::ProjectType),
            "feature" => Ok(Self::Feature),
            other => Err(CatalogItemError::UnknownCategory {
                id: String::new(),
                category: other.to_string(),
            }),
        }
    }
}

/// A priced, categorized line item the estimator can offer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub label: String,
    pub price: Decimal,
    pub category: ItemCategory,
    pub icon: String,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        price: Decimal,
        category: ItemCategory,
        icon: impl Into<String>,
    ) -> Self {
        Self { id: ItemId(id.into()), label: label.into(), price, category, icon: icon.into() }
    }
}

/// Catalog document as stored by an untyped content store.
///
/// Every field is optional and `price` may arrive as a number or as text.
/// Nothing downstream consumes this type directly; it must pass through
/// [`RawCatalogItem::normalize`] or [`normalize_catalog`] first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawCatalogItem {
    pub id: String,
    pub label: String,
    pub price: Value,
    pub category: String,
    pub icon: Option<String>,
}

impl RawCatalogItem {
    /// Reads a document field by field so one mistyped field never hides
    /// the rest. Numbers in text fields are kept as their digits; `null`,
    /// booleans and nested values read as empty. Non-object documents
    /// yield an empty item.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };

        Self {
            id: text_field(fields.remove("id")),
            label: text_field(fields.remove("label")),
            price: fields.remove("price").unwrap_or(Value::Null),
            category: text_field(fields.remove("category")),
            icon: Some(text_field(fields.remove("icon"))).filter(|icon| !icon.is_empty()),
        }
    }
}

impl From<Value> for RawCatalogItem {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

fn text_field(value: Option<Value>) -> String {
    match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogItemError {
    #[error("catalog item is missing an id")]
    MissingId,
    #[error("catalog item `{id}` is missing a label")]
    MissingLabel { id: String },
    #[error("catalog item `{id}` has an unusable price `{raw}`")]
    InvalidPrice { id: String, raw: String },
    #[error("catalog item `{id}` has unknown category `{category}`")]
    UnknownCategory { id: String, category: String },
    #[error("catalog item `{id}` duplicates an earlier {category} entry")]
    DuplicateId { id: String, category: &'static str },
}

impl RawCatalogItem {
    pub fn normalize(self) -> Result<CatalogItem, CatalogItemError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(CatalogItemError::MissingId);
        }

        let label = self.label.trim().to_string();
        if label.is_empty() {
            return Err(CatalogItemError::MissingLabel { id });
        }

        let category = self.category.parse::<ItemCategory>().map_err(|_| {
            CatalogItemError::UnknownCategory { id: id.clone(), category: self.category.clone() }
        })?;

        let price = coerce_price(&self.price).ok_or_else(|| CatalogItemError::InvalidPrice {
            id: id.clone(),
            raw: self.price.to_string(),
        })?;

        let icon = self
            .icon
            .map(|icon| icon.trim().to_string())
            .filter(|icon| !icon.is_empty())
            .unwrap_or_else(|| DEFAULT_ICON.to_string());

        Ok(CatalogItem { id: ItemId(id), label, price, category, icon })
    }
}

/// Largest price a catalog item may carry. Keeps any selection total far
/// inside the `Decimal` range.
pub const MAX_ITEM_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Coerces a loosely typed price into a non-negative decimal.
///
/// Numbers must be finite, non-negative and at most [`MAX_ITEM_PRICE`].
/// Text is trimmed and may carry a leading `$` and `,` group separators.
/// Anything else yields `None`.
pub fn coerce_price(value: &Value) -> Option<Decimal> {
    let price = match value {
        Value::Number(number) => {
            if let Some(unsigned) = number.as_u64() {
                Decimal::from(unsigned)
            } else if let Some(signed) = number.as_i64() {
                Decimal::from(signed)
            } else {
                let float = number.as_f64()?;
                if !float.is_finite() {
                    return None;
                }
                Decimal::try_from(float).ok()?
            }
        }
        Value::String(text) => {
            let trimmed = text.trim();
            let unprefixed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
            if unprefixed.is_empty() {
                return None;
            }
            Decimal::from_str(&unprefixed.replace(',', "")).ok()?
        }
        _ => return None,
    };

    if price.is_sign_negative() && !price.is_zero() {
        return None;
    }
    let price = price.abs();
    (price <= MAX_ITEM_PRICE).then_some(price)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizedCatalog {
    pub items: Vec<CatalogItem>,
    pub rejected: Vec<CatalogItemError>,
}

/// Normalizes raw documents in order, keeping the first item per
/// `(category, id)` and collecting every rejection.
pub fn normalize_catalog(raw_items: Vec<RawCatalogItem>) -> NormalizedCatalog {
    let mut seen = HashSet::new();
    let mut normalized = NormalizedCatalog::default();

    for raw in raw_items {
        match raw.normalize() {
            Ok(item) => {
                if seen.insert((item.category, item.id.clone())) {
                    normalized.items.push(item);
                } else {
                    normalized.rejected.push(CatalogItemError::DuplicateId {
                        id: item.id.0,
                        category: item.category.as_str(),
                    });
                }
            }
            Err(error) => normalized.rejected.push(error),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{
        coerce_price, normalize_catalog, CatalogItemError, ItemCategory, RawCatalogItem,
        MAX_ITEM_PRICE,
    };

    fn raw(id: &str, price: serde_json::Value, category: &str) -> RawCatalogItem {
        RawCatalogItem {
            id: id.to_string(),
            label: format!("Item {id}"),
            price,
            category: category.to_string(),
            icon: None,
        }
    }

    #[test]
    fn numeric_text_prices_are_coerced() {
        assert_eq!(coerce_price(&json!("2500")), Some(Decimal::from(2500)));
        assert_eq!(coerce_price(&json!(" $1,200 ")), Some(Decimal::from(1200)));
        assert_eq!(coerce_price(&json!(800)), Some(Decimal::from(800)));
        assert_eq!(coerce_price(&json!(99.5)), Some(Decimal::new(995, 1)));
    }

    #[test]
    fn unusable_prices_are_refused() {
        assert_eq!(coerce_price(&json!(-5)), None);
        assert_eq!(coerce_price(&json!("-10")), None);
        assert_eq!(coerce_price(&json!("call us")), None);
        assert_eq!(coerce_price(&json!("")), None);
        assert_eq!(coerce_price(&json!(null)), None);
        assert_eq!(coerce_price(&json!(true)), None);
    }

    #[test]
    fn prices_above_the_ceiling_are_refused() {
        assert_eq!(coerce_price(&json!("1,000,000,000")), Some(MAX_ITEM_PRICE));
        assert_eq!(coerce_price(&json!(1_000_000_001_u64)), None);
        assert_eq!(coerce_price(&json!("50000000000000000000000000000")), None);
        assert_eq!(coerce_price(&json!(1e300)), None);

        let normalized = normalize_catalog(vec![
            raw("big", json!("50000000000000000000000000000"), "project_type"),
            raw("huge", json!("50000000000000000000000000000"), "feature"),
        ]);

        assert!(normalized.items.is_empty());
        assert_eq!(
            normalized.rejected,
            vec![
                CatalogItemError::InvalidPrice {
                    id: "big".to_string(),
                    raw: "\"50000000000000000000000000000\"".to_string()
                },
                CatalogItemError::InvalidPrice {
                    id: "huge".to_string(),
                    raw: "\"50000000000000000000000000000\"".to_string()
                },
            ]
        );
    }

    #[test]
    fn normalize_applies_defaults_and_category_parsing() {
        let item = RawCatalogItem {
            id: " seo ".to_string(),
            label: "Advanced SEO".to_string(),
            price: json!("800"),
            category: "FEATURE".to_string(),
            icon: Some("  ".to_string()),
        }
        .normalize()
        .expect("item should normalize");

        assert_eq!(item.id.as_str(), "seo");
        assert_eq!(item.category, ItemCategory::Feature);
        assert_eq!(item.price, Decimal::from(800));
        assert_eq!(item.icon, "layout");
    }

    #[test]
    fn normalize_catalog_keeps_first_duplicate_and_reports_rejections() {
        let normalized = normalize_catalog(vec![
            raw("landing", json!(1000), "project_type"),
            raw("landing", json!(9000), "project_type"),
            raw("landing", json!(50), "feature"),
            raw("broken", json!("n/a"), "feature"),
            raw("mystery", json!(10), "bundle"),
            raw("", json!(10), "feature"),
        ]);

        assert_eq!(normalized.items.len(), 2);
        assert_eq!(normalized.items[0].price, Decimal::from(1000));
        assert_eq!(normalized.items[1].category, ItemCategory::Feature);
        assert_eq!(
            normalized.rejected,
            vec![
                CatalogItemError::DuplicateId {
                    id: "landing".to_string(),
                    category: "project_type"
                },
                CatalogItemError::InvalidPrice {
                    id: "broken".to_string(),
                    raw: "\"n/a\"".to_string()
                },
                CatalogItemError::UnknownCategory {
                    id: "mystery".to_string(),
                    category: "bundle".to_string()
                },
                CatalogItemError::MissingId,
            ]
        );
    }

    #[test]
    fn raw_documents_deserialize_with_missing_fields() {
        let raw: RawCatalogItem =
            serde_json::from_str(r#"{"id":"cms","price":"2000"}"#).expect("decode");
        assert_eq!(raw.label, "");
        assert!(matches!(raw.normalize(), Err(CatalogItemError::MissingLabel { .. })));
    }

    #[test]
    fn mistyped_fields_keep_the_rest_of_the_document() {
        let numeric_id: RawCatalogItem = serde_json::from_value(json!({
            "id": 7,
            "label": "Blog",
            "price": 300,
            "category": "feature"
        }))
        .expect("decode");
        let item = numeric_id.normalize().expect("numeric id is kept as text");
        assert_eq!(item.id.as_str(), "7");

        let null_label: RawCatalogItem = serde_json::from_value(json!({
            "id": "chat",
            "label": null,
            "price": "1200",
            "category": "feature",
            "icon": false
        }))
        .expect("decode");
        assert_eq!(null_label.icon, None);
        assert_eq!(
            null_label.normalize(),
            Err(CatalogItemError::MissingLabel { id: "chat".to_string() })
        );

        let numeric_category = RawCatalogItem::from_value(json!({
            "id": "seo",
            "label": "Advanced SEO",
            "price": 800,
            "category": 2
        }));
        assert_eq!(
            numeric_category.normalize(),
            Err(CatalogItemError::UnknownCategory {
                id: "seo".to_string(),
                category: "2".to_string()
            })
        );
    }

    #[test]
    fn non_object_documents_read_as_empty_items() {
        assert_eq!(RawCatalogItem::from_value(json!(["landing"])), RawCatalogItem::default());
        assert_eq!(
            RawCatalogItem::from_value(json!("landing")).normalize(),
            Err(CatalogItemError::MissingId)
        );
    }
}
