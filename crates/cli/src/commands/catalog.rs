use serde_json::json;
use sitequote_core::estimator::CatalogLoadReport;
use sitequote_db::load_configured_catalog;

use crate::commands::{load_config, open_database, runtime, CommandResult, Failure};

pub fn run() -> CommandResult {
    let config = match load_config("catalog") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let runtime = match runtime("catalog") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let report = load_configured_catalog(&config.catalog, &pool).await;
        pool.close().await;
        Ok::<CatalogLoadReport, Failure>(report)
    });

    match result {
        Ok(report) => CommandResult::success_with_data(
            "catalog",
            describe(&report),
            Some(json!({
                "origin": report.catalog.origin(),
                "project_types": report.catalog.project_types(),
                "features": report.catalog.features(),
                "rejected": report.rejected.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "fetch_error": report.fetch_error.as_ref().map(ToString::to_string),
            })),
        ),
        Err(failure) => CommandResult::from_failure("catalog", failure),
    }
}

pub(crate) fn describe(report: &CatalogLoadReport) -> String {
    format!(
        "{} project types and {} features from {} catalog",
        report.catalog.project_types().len(),
        report.catalog.features().len(),
        report.catalog.origin().as_str()
    )
}
