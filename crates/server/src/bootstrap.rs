use std::sync::Arc;

use sitequote_core::calculators::RoiCalculator;
use sitequote_core::config::{AppConfig, ConfigError, LoadOptions};
use sitequote_core::errors::DomainError;
use sitequote_core::estimator::ActiveCatalog;
use sitequote_db::{connect, load_configured_catalog, migrations, DbPool};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub catalog: Arc<ActiveCatalog>,
    pub roi: RoiCalculator,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("estimator settings rejected: {0}")]
    Estimator(#[source] DomainError),
}

#[allow(dead_code)]
pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Connects, migrates and resolves the catalog once. The catalog never
/// fails bootstrap; an unusable source resolves to the fallback.
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let roi = RoiCalculator::with_uplift(config.estimator.roi_conversion_uplift)
        .map_err(BootstrapError::Estimator)?;

    let db_pool = connect(&config.database)
        .await
        .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let report = load_configured_catalog(&config.catalog, &db_pool).await;

    Ok(Application { config, db_pool, catalog: Arc::new(report.catalog), roi })
}

#[cfg(test)]
mod tests {
    use sitequote_core::config::{CatalogSourceKind, ConfigOverrides, LoadOptions};
    use sitequote_core::estimator::CatalogOrigin;
    use sitequote_db::CatalogSeed;

    use crate::bootstrap::bootstrap;

    fn options(catalog_source: CatalogSourceKind) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                catalog_source: Some(catalog_source),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_catalog_settings() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                catalog_source: Some(CatalogSourceKind::Remote),
                catalog_remote_url: Some("ftp://catalog.example.com".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("catalog.remote_url"), "{message}");
    }

    #[tokio::test]
    async fn fresh_database_serves_fallback_catalog() {
        let app = bootstrap(options(CatalogSourceKind::Database))
            .await
            .expect("bootstrap should succeed on an empty database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('content_document', 'leads')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected baseline tables after bootstrap");
        assert_eq!(table_count, 2);
        assert_eq!(app.catalog.origin(), CatalogOrigin::Fallback);

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn fallback_source_skips_the_content_store() {
        let app = bootstrap(options(CatalogSourceKind::Fallback)).await.expect("bootstrap");

        assert_eq!(app.catalog.origin(), CatalogOrigin::Fallback);
        assert!(app.catalog.find_project_type("landing").is_some());

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn seeded_database_catalog_is_served_after_reload() {
        let app = bootstrap(options(CatalogSourceKind::Database)).await.expect("bootstrap");
        CatalogSeed::load(&app.db_pool).await.expect("seed");

        let report =
            sitequote_db::load_configured_catalog(&app.config.catalog, &app.db_pool).await;

        assert_eq!(report.catalog.origin(), CatalogOrigin::Remote);
        assert!(report.catalog.find_project_type("mobile").is_some());
        assert!(report.catalog.find_feature("multilingual").is_some());

        app.db_pool.close().await;
    }
}
