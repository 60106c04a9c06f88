use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use sitequote_core::estimator::CatalogOrigin;
use sitequote_db::DbPool;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    catalog_origin: CatalogOrigin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub catalog: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, catalog_origin: CatalogOrigin) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool, catalog_origin })
}

/// Readiness follows the database only. A fallback catalog still serves
/// quotes, so it is reported without degrading the service.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let ready = database.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "sitequote-server runtime initialized".to_string(),
        },
        database,
        catalog: catalog_check(state.catalog_origin),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

fn catalog_check(origin: CatalogOrigin) -> HealthCheck {
    let detail = match origin {
        CatalogOrigin::Remote => "serving catalog from the configured content store",
        CatalogOrigin::Fallback => "serving built-in fallback catalog",
    };
    HealthCheck { status: "ready", detail: detail.to_string() }
}
