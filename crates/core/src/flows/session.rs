use std::sync::Arc;

use thiserror::Error;

use crate::audit::{AuditContext, AuditSink};
use crate::estimator::{ActiveCatalog, CatalogLoad, EstimatorEngine, Quote};
use crate::flows::engine::{EstimatorFlow, FlowEngine, FlowTransitionError};
use crate::flows::states::{FlowContext, FlowEvent, FlowState, TransitionOutcome};

/// Result of pricing a complete selection in one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PricedSelection {
    pub quote: Quote,
    pub summary: String,
    /// Feature ids that were unknown or repeated, in request order.
    pub ignored_features: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("`{0}` is not a project type in the active catalog")]
    UnknownProjectType(String),
    #[error(transparent)]
    Flow(#[from] FlowTransitionError),
}

/// An estimator interaction gated by [`EstimatorFlow`].
///
/// The engine does the pricing; the flow decides which operations are
/// allowed in the current step. Every transition is audited.
pub struct EstimatorSession {
    flow: FlowEngine<EstimatorFlow>,
    state: FlowState,
    engine: Option<EstimatorEngine>,
    audit: AuditContext,
    sink: Arc<dyn AuditSink>,
}

impl EstimatorSession {
    pub fn new(audit: AuditContext, sink: Arc<dyn AuditSink>) -> Self {
        let flow = FlowEngine::default();
        let state = flow.initial_state();
        Self { flow, state, engine: None, audit, sink }
    }

    /// Starts directly at project-type selection with an already loaded catalog.
    pub fn with_catalog(
        catalog: ActiveCatalog,
        audit: AuditContext,
        sink: Arc<dyn AuditSink>,
    ) -> Result<Self, FlowTransitionError> {
        let mut session = Self::new(audit, sink);
        session.install(catalog)?;
        Ok(session)
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn engine(&self) -> Option<&EstimatorEngine> {
        self.engine.as_ref()
    }

    /// Feeds provider state into the session. `Loading` keeps the session
    /// waiting and returns `None`.
    pub fn receive_catalog(
        &mut self,
        load: CatalogLoad,
    ) -> Result<Option<TransitionOutcome>, FlowTransitionError> {
        match ActiveCatalog::resolve(load) {
            Some(catalog) => self.install(catalog).map(Some),
            None => Ok(None),
        }
    }

    /// Returns `Ok(false)` for ids outside the project-type partition.
    pub fn select_type(&mut self, id: &str) -> Result<bool, FlowTransitionError> {
        let known = self
            .engine
            .as_ref()
            .is_some_and(|engine| engine.catalog().find_project_type(id).is_some());
        if !known {
            if self.engine.is_none() {
                self.advance(FlowEvent::TypeSelected, FlowContext::default())?;
            }
            return Ok(false);
        }

        self.advance(FlowEvent::TypeSelected, FlowContext::with_type_selected(true))?;
        Ok(self.engine.as_mut().is_some_and(|engine| engine.select_type(id)))
    }

    /// Feature toggles only apply while features are being chosen.
    pub fn toggle_feature(&mut self, id: &str) -> bool {
        if self.state != FlowState::ChoosingFeatures {
            return false;
        }
        self.engine.as_mut().is_some_and(|engine| engine.toggle_feature(id))
    }

    pub fn calculate(&mut self) -> Result<Quote, FlowTransitionError> {
        let context = self.type_context();
        self.advance(FlowEvent::CalculateRequested, context)?;
        Ok(self.current_quote())
    }

    /// Back to feature picking with the selection intact.
    pub fn revise(&mut self) -> Result<(), FlowTransitionError> {
        let context = self.type_context();
        self.advance(FlowEvent::ReviseRequested, context).map(|_| ())
    }

    pub fn start_over(&mut self) -> Result<(), FlowTransitionError> {
        let context = self.type_context();
        self.advance(FlowEvent::StartOver, context)?;
        if let Some(engine) = self.engine.as_mut() {
            engine.reset();
        }
        Ok(())
    }

    /// Selects `project_type`, toggles each listed feature once and
    /// calculates. Unknown or repeated feature ids are reported, not fatal.
    pub fn price_selection(
        &mut self,
        project_type: &str,
        features: &[String],
    ) -> Result<PricedSelection, SelectionError> {
        if !self.select_type(project_type)? {
            return Err(SelectionError::UnknownProjectType(project_type.to_string()));
        }

        let mut ignored_features = Vec::new();
        for feature in features {
            let already_selected = self.engine.as_ref().is_some_and(|engine| {
                engine.selection().selected_features().iter().any(|id| id.as_str() == feature)
            });
            if already_selected || !self.toggle_feature(feature) {
                ignored_features.push(feature.clone());
            }
        }

        let quote = self.calculate()?;
        let summary = self.summary().unwrap_or_default();
        Ok(PricedSelection { quote, summary, ignored_features })
    }

    /// Summary text for the contact handoff, once a result is showing.
    pub fn summary(&self) -> Option<String> {
        if self.state != FlowState::ShowingResult {
            return None;
        }
        self.engine.as_ref().map(EstimatorEngine::summary)
    }

    fn install(&mut self, catalog: ActiveCatalog) -> Result<TransitionOutcome, FlowTransitionError> {
        let outcome = self.advance(FlowEvent::CatalogLoaded, FlowContext::default())?;
        self.engine = Some(EstimatorEngine::new(catalog));
        Ok(outcome)
    }

    fn current_quote(&self) -> Quote {
        self.engine.as_ref().map(EstimatorEngine::compute_quote).unwrap_or_default()
    }

    fn type_context(&self) -> FlowContext {
        FlowContext::with_type_selected(
            self.engine.as_ref().is_some_and(|engine| engine.selection().has_type()),
        )
    }

    fn advance(
        &mut self,
        event: FlowEvent,
        context: FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        let outcome = self.flow.apply_with_audit(
            &self.state,
            &event,
            &context,
            self.sink.as_ref(),
            &self.audit,
        )?;
        self.state = outcome.to.clone();
        Ok(outcome)
    }
}
