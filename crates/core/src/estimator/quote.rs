use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogItem, ItemCategory, ItemId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub item_id: ItemId,
    pub label: String,
    pub price: Decimal,
    pub category: ItemCategory,
}

impl From<&CatalogItem> for BreakdownLine {
    fn from(item: &CatalogItem) -> Self {
        Self {
            item_id: item.id.clone(),
            label: item.label.clone(),
            price: item.price,
            category: item.category,
        }
    }
}

/// Priced view of a selection. Derived on demand, never stored.
///
/// `breakdown` lists the project type first (when one is selected) and then
/// each feature in the order it was selected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub total: Decimal,
    pub breakdown: Vec<BreakdownLine>,
}

impl Quote {
    pub fn from_lines(breakdown: Vec<BreakdownLine>) -> Self {
        let total = breakdown
            .iter()
            .fold(Decimal::ZERO, |total, line| total.saturating_add(line.price));
        Self { total, breakdown }
    }

    pub fn project_type(&self) -> Option<&BreakdownLine> {
        self.breakdown.first().filter(|line| line.category == ItemCategory::ProjectType)
    }

    pub fn features(&self) -> impl Iterator<Item = &BreakdownLine> {
        self.breakdown.iter().filter(|line| line.category == ItemCategory::Feature)
    }

    pub fn is_empty(&self) -> bool {
        self.breakdown.is_empty()
    }
}
