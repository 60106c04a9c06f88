pub mod engine;
pub mod session;
pub mod states;

pub use engine::{EstimatorFlow, FlowDefinition, FlowEngine, FlowTransitionError};
pub use session::{EstimatorSession, PricedSelection, SelectionError};
pub use states::{FlowAction, FlowContext, FlowEvent, FlowState, FlowType, TransitionOutcome};
