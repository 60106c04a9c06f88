//! Project cost estimator: catalog resolution, selection state, pricing and
//! the summary text handed to the contact form.

pub mod catalog;
pub mod engine;
pub mod quote;
pub mod summary;

pub use catalog::{
    fallback_items, load_catalog, ActiveCatalog, CatalogFetchError, CatalogLoad,
    CatalogLoadReport, CatalogOrigin, CatalogProvider,
};
pub use engine::{EstimatorEngine, SelectionState};
pub use quote::{BreakdownLine, Quote};
pub use summary::{format_dollars, format_summary, format_whole_amount, UNKNOWN_PROJECT_LABEL};
