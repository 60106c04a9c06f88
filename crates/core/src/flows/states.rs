use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowType {
    Estimator,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    Loading,
    ChoosingType,
    ChoosingFeatures,
    ShowingResult,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowEvent {
    CatalogLoaded,
    TypeSelected,
    CalculateRequested,
    /// Back from the result to feature picking, keeping the selection.
    ReviseRequested,
    StartOver,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    pub project_type_selected: bool,
}

impl FlowContext {
    pub fn with_type_selected(project_type_selected: bool) -> Self {
        Self { project_type_selected }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    PresentProjectTypes,
    PresentFeatures,
    ComputeQuote,
    OfferContactHandoff,
    ClearSelection,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: FlowState,
    pub to: FlowState,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}
