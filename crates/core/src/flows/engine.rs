use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditOutcome, AuditSink};
use crate::flows::states::{
    FlowAction, FlowContext, FlowEvent, FlowState, FlowType, TransitionOutcome,
};

pub trait FlowDefinition {
    fn flow_type(&self) -> FlowType;
    fn initial_state(&self) -> FlowState;
    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// Catalog load, type choice, feature choice, result.
#[derive(Clone, Debug, Default)]
pub struct EstimatorFlow;

impl FlowDefinition for EstimatorFlow {
    fn flow_type(&self) -> FlowType {
        FlowType::Estimator
    }

    fn initial_state(&self) -> FlowState {
        FlowState::Loading
    }

    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_estimator(current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn flow_type(&self) -> FlowType {
        self.flow.flow_type()
    }

    pub fn initial_state(&self) -> FlowState {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        context: &FlowContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                let applied = audit
                    .event("estimator.transition_applied", AuditCategory::Estimator, AuditOutcome::Success)
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event));
                sink.emit(applied);
            }
            Err(error) => {
                let rejected = audit
                    .event("estimator.transition_rejected", AuditCategory::Estimator, AuditOutcome::Rejected)
                    .with_metadata("error", error.to_string());
                sink.emit(rejected);
            }
        }
        result
    }
}

impl Default for FlowEngine<EstimatorFlow> {
    fn default() -> Self {
        Self::new(EstimatorFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("a project type must be selected before {event:?} in {state:?}")]
    ProjectTypeRequired { state: FlowState, event: FlowEvent },
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FlowState, event: FlowEvent },
}

fn transition_estimator(
    current: &FlowState,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowAction::{
        ClearSelection, ComputeQuote, OfferContactHandoff, PresentFeatures, PresentProjectTypes,
    };
    use FlowEvent::{CalculateRequested, CatalogLoaded, ReviseRequested, StartOver, TypeSelected};
    use FlowState::{ChoosingFeatures, ChoosingType, Loading, ShowingResult};

    let require_type = || {
        if context.project_type_selected {
            Ok(())
        } else {
            Err(FlowTransitionError::ProjectTypeRequired {
                state: current.clone(),
                event: event.clone(),
            })
        }
    };

    let (to, actions) = match (current, event) {
        (Loading, CatalogLoaded) => (ChoosingType, vec![PresentProjectTypes]),
        (ChoosingType, TypeSelected) | (ChoosingFeatures, TypeSelected) => {
            require_type()?;
            (ChoosingFeatures, vec![PresentFeatures])
        }
        (ChoosingType, CalculateRequested) | (ChoosingFeatures, CalculateRequested) => {
            require_type()?;
            (ShowingResult, vec![ComputeQuote, OfferContactHandoff])
        }
        (ShowingResult, ReviseRequested) => (ChoosingFeatures, vec![PresentFeatures]),
        (ChoosingType, StartOver) | (ChoosingFeatures, StartOver) | (ShowingResult, StartOver) => {
            (ChoosingType, vec![ClearSelection, PresentProjectTypes])
        }
        _ => {
            return Err(FlowTransitionError::InvalidTransition {
                state: current.clone(),
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: current.clone(), to, event: event.clone(), actions })
}
