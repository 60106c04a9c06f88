use std::sync::Arc;

use serde_json::json;
use sitequote_core::audit::{AuditContext, TracingAuditSink};
use sitequote_core::estimator::{format_dollars, ActiveCatalog};
use sitequote_core::flows::{EstimatorSession, PricedSelection, SelectionError};
use sitequote_db::load_configured_catalog;
use uuid::Uuid;

use crate::commands::{load_config, open_database, runtime, CommandResult, Failure, EXIT_INPUT};

pub fn run(project_type: &str, features: &[String]) -> CommandResult {
    let config = match load_config("estimate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let runtime = match runtime("estimate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let loaded = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let report = load_configured_catalog(&config.catalog, &pool).await;
        pool.close().await;
        Ok::<ActiveCatalog, Failure>(report.catalog)
    });
    let catalog = match loaded {
        Ok(catalog) => catalog,
        Err(failure) => return CommandResult::from_failure("estimate", failure),
    };

    let origin = catalog.origin();
    match price(catalog, project_type, features) {
        Ok(estimate) => CommandResult::success_with_data(
            "estimate",
            format!("estimated budget {}", format_dollars(estimate.quote.total)),
            Some(json!({
                "catalog_origin": origin,
                "quote": estimate.quote,
                "summary": estimate.summary,
                "ignored_features": estimate.ignored_features,
            })),
        ),
        Err(failure) => CommandResult::from_failure("estimate", failure),
    }
}

/// Prices the selection through the estimator workflow. Unknown feature
/// ids are reported, not fatal.
pub(crate) fn price(
    catalog: ActiveCatalog,
    project_type: &str,
    features: &[String],
) -> Result<PricedSelection, Failure> {
    let audit = AuditContext::new(None, Uuid::new_v4().to_string(), "cli");
    let mut session = EstimatorSession::with_catalog(catalog, audit, Arc::new(TracingAuditSink))
        .map_err(|error| ("estimator_flow", error.to_string(), EXIT_INPUT))?;

    session.price_selection(project_type, features).map_err(|error| match error {
        SelectionError::UnknownProjectType(_) => {
            ("invalid_selection", error.to_string(), EXIT_INPUT)
        }
        SelectionError::Flow(_) => ("estimator_flow", error.to_string(), EXIT_INPUT),
    })
}
