pub mod catalog;
pub mod connection;
pub mod fixtures;
pub mod intake;
pub mod migrations;
pub mod repositories;

pub use catalog::{
    load_configured_catalog, DocumentCatalogProvider, RemoteCatalogProvider, ESTIMATOR_COLLECTION,
};
pub use connection::{connect, connect_with_settings, DbPool};
pub use fixtures::{CatalogSeed, SeedResult, VerificationResult};
pub use intake::{LeadError, LeadIntake};
