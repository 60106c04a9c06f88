use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::ActiveCatalog;
use super::quote::{BreakdownLine, Quote};
use super::summary::format_summary;
use crate::domain::catalog::ItemId;

/// What the visitor has picked so far.
///
/// Features are only recorded once a project type is chosen, so a non-empty
/// feature list always implies a selected type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    selected_type: Option<ItemId>,
    selected_features: Vec<ItemId>,
}

impl SelectionState {
    pub fn selected_type(&self) -> Option<&ItemId> {
        self.selected_type.as_ref()
    }

    /// Selected features in the order they were picked.
    pub fn selected_features(&self) -> &[ItemId] {
        &self.selected_features
    }

    pub fn has_type(&self) -> bool {
        self.selected_type.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_type.is_none() && self.selected_features.is_empty()
    }
}

/// One visitor's estimator interaction: the active catalog plus the
/// selection made against it.
#[derive(Clone, Debug)]
pub struct EstimatorEngine {
    catalog: ActiveCatalog,
    selection: SelectionState,
}

impl EstimatorEngine {
    pub fn new(catalog: ActiveCatalog) -> Self {
        Self { catalog, selection: SelectionState::default() }
    }

    pub fn catalog(&self) -> &ActiveCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Selects a project type. Ids outside the project-type partition are
    /// ignored; returns whether `id` was accepted.
    pub fn select_type(&mut self, id: &str) -> bool {
        match self.catalog.find_project_type(id) {
            Some(item) => {
                self.selection.selected_type = Some(item.id.clone());
                true
            }
            None => false,
        }
    }

    /// Adds the feature if absent, removes it if present. Unknown ids and
    /// toggles made before any project type is chosen are ignored.
    pub fn toggle_feature(&mut self, id: &str) -> bool {
        if !self.selection.has_type() || self.catalog.find_feature(id).is_none() {
            return false;
        }

        let features = &mut self.selection.selected_features;
        match features.iter().position(|selected| selected.as_str() == id) {
            Some(index) => {
                features.remove(index);
            }
            None => features.push(ItemId(id.to_string())),
        }
        true
    }

    pub fn reset(&mut self) {
        self.selection = SelectionState::default();
    }

    /// Prices whatever is currently selected. Does not gate on a type being
    /// chosen; callers that present totals do that.
    pub fn compute_quote(&self) -> Quote {
        let project_type = self
            .selection
            .selected_type
            .as_ref()
            .and_then(|id| self.catalog.find_project_type(id.as_str()))
            .map(BreakdownLine::from);

        let features = self
            .selection
            .selected_features
            .iter()
            .filter_map(|id| self.catalog.find_feature(id.as_str()))
            .map(BreakdownLine::from);

        Quote::from_lines(project_type.into_iter().chain(features).collect())
    }

    /// Total to show the visitor: zero until a project type is chosen.
    pub fn presented_total(&self) -> Decimal {
        if self.selection.has_type() {
            self.compute_quote().total
        } else {
            Decimal::ZERO
        }
    }

    pub fn summary(&self) -> String {
        format_summary(&self.compute_quote())
    }
}
