//! JSON API for the estimator, the calculators and lead intake.
//!
//! Every response carries a correlation id, taken from `x-correlation-id`
//! when the caller sends one.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sitequote_core::audit::{AuditContext, TracingAuditSink};
use sitequote_core::calculators::{
    build_timeline, score_answers, HealthReport, ProjectTimeline, RoiCalculator, RoiInputs,
    RoiProjection,
};
use sitequote_core::domain::catalog::CatalogItem;
use sitequote_core::domain::lead::{ContactDraft, Lead, LeadKind};
use sitequote_core::errors::{ApplicationError, DomainError, InterfaceError};
use sitequote_core::estimator::{ActiveCatalog, CatalogOrigin, Quote};
use sitequote_core::flows::{EstimatorSession, PricedSelection, SelectionError};
use sitequote_db::repositories::SqlLeadRepository;
use sitequote_db::{DbPool, LeadError, LeadIntake};
use tracing::info;
use uuid::Uuid;

use crate::bootstrap::Application;

const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct ApiState {
    pub db_pool: DbPool,
    pub catalog: Arc<ActiveCatalog>,
    pub roi: RoiCalculator,
}

impl From<&Application> for ApiState {
    fn from(app: &Application) -> Self {
        Self { db_pool: app.db_pool.clone(), catalog: app.catalog.clone(), roi: app.roi.clone() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

type Rejection = (StatusCode, Json<ApiError>);

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub origin: CatalogOrigin,
    pub project_types: Vec<CatalogItem>,
    pub features: Vec<CatalogItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub catalog_origin: CatalogOrigin,
    pub quote: Quote,
    pub summary: String,
    pub ignored_features: Vec<String>,
    pub correlation_id: String,
}

#[derive(Debug, Serialize)]
pub struct RoiResponse {
    pub uplift: Decimal,
    pub projection: RoiProjection,
}

#[derive(Debug, Deserialize)]
pub struct TimelineRequest {
    pub project_type: String,
    #[serde(default)]
    pub start: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct HealthCheckRequest {
    pub answers: Vec<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewsletterRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LeadReceipt {
    pub id: String,
    pub kind: LeadKind,
    pub submitted_at: DateTime<Utc>,
    pub correlation_id: String,
}

impl LeadReceipt {
    fn new(lead: &Lead, correlation_id: String) -> Self {
        Self {
            id: lead.id.0.clone(),
            kind: lead.kind,
            submitted_at: lead.submitted_at,
            correlation_id,
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/estimator/catalog", get(get_catalog))
        .route("/api/v1/estimator/quote", post(post_quote))
        .route("/api/v1/calculators/roi", post(post_roi))
        .route("/api/v1/calculators/timeline", post(post_timeline))
        .route("/api/v1/calculators/health-check", post(post_health_check))
        .route("/api/v1/leads/contact", post(post_contact))
        .route("/api/v1/leads/newsletter", post(post_newsletter))
        .with_state(state)
}

async fn get_catalog(State(state): State<ApiState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        origin: state.catalog.origin(),
        project_types: state.catalog.project_types().to_vec(),
        features: state.catalog.features().to_vec(),
    })
}

async fn post_quote(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, Rejection> {
    let correlation_id = correlation_id(&headers);
    let audit = AuditContext::new(None, correlation_id.clone(), "api");
    let mut session = EstimatorSession::with_catalog(
        state.catalog.as_ref().clone(),
        audit,
        Arc::new(TracingAuditSink),
    )
    .map_err(|error| domain_rejection(error.into(), &correlation_id))?;

    let Some(project_type) = request.project_type.as_deref() else {
        return Err(unprocessable(
            "a project type from the active catalog is required",
            &correlation_id,
        ));
    };

    let PricedSelection { quote, summary, ignored_features } = session
        .price_selection(project_type, &request.features)
        .map_err(|error| match error {
            SelectionError::UnknownProjectType(_) => {
                unprocessable(&error.to_string(), &correlation_id)
            }
            SelectionError::Flow(flow) => domain_rejection(flow.into(), &correlation_id),
        })?;

    info!(
        event_name = "api.quote.computed",
        correlation_id = %correlation_id,
        total = %quote.total,
        lines = quote.breakdown.len(),
        ignored = ignored_features.len(),
        "estimator quote computed"
    );

    Ok(Json(QuoteResponse {
        catalog_origin: state.catalog.origin(),
        quote,
        summary,
        ignored_features,
        correlation_id,
    }))
}

async fn post_roi(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(inputs): Json<RoiInputs>,
) -> Result<Json<RoiResponse>, Rejection> {
    let correlation_id = correlation_id(&headers);
    let projection =
        state.roi.project(&inputs).map_err(|error| domain_rejection(error, &correlation_id))?;
    Ok(Json(RoiResponse { uplift: state.roi.uplift(), projection }))
}

async fn post_timeline(
    headers: HeaderMap,
    Json(request): Json<TimelineRequest>,
) -> Result<Json<ProjectTimeline>, Rejection> {
    let correlation_id = correlation_id(&headers);
    let start = request.start.unwrap_or_else(|| Utc::now().date_naive());
    build_timeline(&request.project_type, start)
        .map(Json)
        .map_err(|error| domain_rejection(error, &correlation_id))
}

async fn post_health_check(
    headers: HeaderMap,
    Json(request): Json<HealthCheckRequest>,
) -> Result<Json<HealthReport>, Rejection> {
    let correlation_id = correlation_id(&headers);
    score_answers(&request.answers)
        .map(Json)
        .map_err(|error| domain_rejection(error, &correlation_id))
}

async fn post_contact(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(draft): Json<ContactDraft>,
) -> Result<(StatusCode, Json<LeadReceipt>), Rejection> {
    let correlation_id = correlation_id(&headers);
    let intake = LeadIntake::new(SqlLeadRepository::new(state.db_pool.clone()));
    let lead = intake
        .submit_contact(draft, &correlation_id)
        .await
        .map_err(|error| lead_rejection(error, &correlation_id))?;
    Ok((StatusCode::CREATED, Json(LeadReceipt::new(&lead, correlation_id))))
}

async fn post_newsletter(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(request): Json<NewsletterRequest>,
) -> Result<(StatusCode, Json<LeadReceipt>), Rejection> {
    let correlation_id = correlation_id(&headers);
    let intake = LeadIntake::new(SqlLeadRepository::new(state.db_pool.clone()));
    let lead = intake
        .subscribe(&request.email, &correlation_id)
        .await
        .map_err(|error| lead_rejection(error, &correlation_id))?;
    Ok((StatusCode::CREATED, Json(LeadReceipt::new(&lead, correlation_id))))
}

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn domain_rejection(error: DomainError, correlation_id: &str) -> Rejection {
    application_rejection(ApplicationError::from(error), correlation_id)
}

fn lead_rejection(error: LeadError, correlation_id: &str) -> Rejection {
    let application = match error {
        LeadError::Invalid(invalid) => ApplicationError::from(DomainError::from(invalid)),
        LeadError::Storage(storage) => ApplicationError::Persistence(storage.to_string()),
    };
    application_rejection(application, correlation_id)
}

fn application_rejection(error: ApplicationError, correlation_id: &str) -> Rejection {
    let interface = error.into_interface(correlation_id);
    let status = match interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
    };
    reject(status, interface)
}

fn unprocessable(detail: &str, correlation_id: &str) -> Rejection {
    reject(
        StatusCode::UNPROCESSABLE_ENTITY,
        InterfaceError::BadRequest {
            message: detail.to_string(),
            correlation_id: correlation_id.to_string(),
        },
    )
}

fn reject(status: StatusCode, interface: InterfaceError) -> Rejection {
    let error = interface.user_message().to_string();
    let (detail, correlation_id) = match interface {
        InterfaceError::BadRequest { message, correlation_id }
        | InterfaceError::ServiceUnavailable { message, correlation_id } => (message, correlation_id),
    };
    (status, Json(ApiError { error, detail, correlation_id }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{HeaderValue, Request};
    use sitequote_db::repositories::LeadRepository;
    use sitequote_db::{connect_with_settings, migrations};
    use tower::ServiceExt;

    use super::*;

    async fn state() -> ApiState {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        ApiState {
            db_pool: pool,
            catalog: Arc::new(ActiveCatalog::fallback()),
            roi: RoiCalculator::default(),
        }
    }

    fn headers(correlation_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CORRELATION_HEADER, HeaderValue::from_str(correlation_id).expect("header"));
        headers
    }

    #[tokio::test]
    async fn catalog_lists_sorted_partitions() {
        let Json(catalog) = get_catalog(State(state().await)).await;

        assert_eq!(catalog.origin, CatalogOrigin::Fallback);
        let prices: Vec<Decimal> = catalog.features.iter().map(|item| item.price).collect();
        let mut sorted = prices.clone();
        sorted.sort();
        assert_eq!(prices, sorted);
    }

    #[tokio::test]
    async fn quote_prices_selection_and_echoes_correlation_id() {
        let request = QuoteRequest {
            project_type: Some("landing".to_string()),
            features: vec!["seo".to_string(), "warp-drive".to_string()],
        };

        let Json(response) = post_quote(State(state().await), headers("req-42"), Json(request))
            .await
            .expect("quote");

        assert_eq!(response.quote.total, Decimal::from(1800));
        assert_eq!(response.ignored_features, vec!["warp-drive".to_string()]);
        assert_eq!(response.correlation_id, "req-42");
        assert!(response.summary.ends_with("Estimated Budget: $1,800."));
    }

    #[tokio::test]
    async fn quote_without_project_type_is_unprocessable() {
        let app = router(state().await);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/estimator/quote")
                    .header("content-type", "application/json")
                    .header(CORRELATION_HEADER, "req-7")
                    .body(Body::from(r#"{"features":["seo"]}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let error: ApiError = serde_json::from_slice(&bytes).expect("error json");
        assert_eq!(error.correlation_id, "req-7");
        assert!(error.detail.contains("project type"));
    }

    #[tokio::test]
    async fn feature_id_as_project_type_is_unprocessable() {
        let request =
            QuoteRequest { project_type: Some("seo".to_string()), features: Vec::new() };

        let (status, Json(error)) =
            post_quote(State(state().await), HeaderMap::new(), Json(request))
                .await
                .expect_err("seo is not a project type");

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(error.detail.contains("`seo`"));
    }

    #[tokio::test]
    async fn roi_rejects_negative_rate_as_bad_request() {
        let inputs = RoiInputs {
            monthly_visitors: 500,
            conversion_rate_pct: Decimal::from(-2),
            average_customer_value: Decimal::from(40),
        };

        let (status, Json(error)) = post_roi(State(state().await), headers("req-9"), Json(inputs))
            .await
            .expect_err("negative rate");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.correlation_id, "req-9");
    }

    #[tokio::test]
    async fn roi_with_oversized_inputs_is_bad_request() {
        let inputs = RoiInputs {
            monthly_visitors: 4_000_000_000,
            conversion_rate_pct: Decimal::ONE_HUNDRED,
            average_customer_value: Decimal::from_str_exact("50000000000000000000000")
                .expect("decimal literal"),
        };

        let (status, Json(error)) = post_roi(State(state().await), headers("req-10"), Json(inputs))
            .await
            .expect_err("projection out of range");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error.detail.contains("too large"));
    }

    #[tokio::test]
    async fn timeline_uses_requested_start() {
        let request = TimelineRequest {
            project_type: "Landing Page".to_string(),
            start: NaiveDate::from_ymd_opt(2026, 1, 5),
        };

        let Json(timeline) =
            post_timeline(HeaderMap::new(), Json(request)).await.expect("timeline");

        assert_eq!(timeline.total_weeks, 2);
        assert_eq!(timeline.launch, NaiveDate::from_ymd_opt(2026, 1, 19).expect("date"));
    }

    #[tokio::test]
    async fn health_check_requires_every_answer() {
        let (status, _) =
            post_health_check(HeaderMap::new(), Json(HealthCheckRequest { answers: vec![0, 0] }))
                .await
                .expect_err("too few answers");

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn contact_submission_is_stored() {
        let state = state().await;
        let draft = ContactDraft {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            message: "I used the estimator.".to_string(),
        };

        let (status, Json(receipt)) =
            post_contact(State(state.clone()), headers("req-11"), Json(draft))
                .await
                .expect("stored");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt.kind, LeadKind::Contact);
        let stored = SqlLeadRepository::new(state.db_pool.clone())
            .list_recent(5)
            .await
            .expect("list leads");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].email, "grace@example.com");
    }

    #[tokio::test]
    async fn newsletter_with_invalid_email_is_bad_request() {
        let (status, Json(error)) = post_newsletter(
            State(state().await),
            HeaderMap::new(),
            Json(NewsletterRequest { email: "nobody".to_string() }),
        )
        .await
        .expect_err("invalid email");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error.detail.contains("nobody"));
        assert!(!error.correlation_id.is_empty());
    }

    #[tokio::test]
    async fn newsletter_on_closed_pool_is_unavailable() {
        let state = state().await;
        state.db_pool.close().await;

        let (status, _) = post_newsletter(
            State(state),
            HeaderMap::new(),
            Json(NewsletterRequest { email: "ada@example.com".to_string() }),
        )
        .await
        .expect_err("pool closed");

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
