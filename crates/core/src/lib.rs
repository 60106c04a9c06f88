pub mod audit;
pub mod calculators;
pub mod config;
pub mod domain;
pub mod errors;
pub mod estimator;
pub mod flows;

pub use calculators::{
    build_timeline, score_answers, HealthReport, HealthVerdict, ProjectTimeline, RoiCalculator,
    RoiInputs, RoiProjection, DEFAULT_CONVERSION_UPLIFT,
};
pub use domain::catalog::{
    CatalogItem, CatalogItemError, ItemCategory, ItemId, NormalizedCatalog, RawCatalogItem,
};
pub use domain::lead::{
    ContactDraft, ContactMessage, Lead, LeadId, LeadKind, LeadValidationError,
    NewsletterSubscription,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use estimator::{
    load_catalog, ActiveCatalog, CatalogFetchError, CatalogLoad, CatalogLoadReport, CatalogOrigin,
    CatalogProvider, EstimatorEngine, Quote, SelectionState,
};
pub use flows::{EstimatorFlow, EstimatorSession, FlowEngine, FlowState, FlowTransitionError};
