//! HTTP Handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use upsell_core::{
    memory::CartEntry, Decision, DecisionState, MemoryNavigator, Navigator, NudgeRequest,
    ReceiptId, SiteId, UpsellError, UpsellPage,
};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NudgeQuery {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub receipt_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub receipt_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub state: DecisionState,
    pub redirect: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: &UpsellError) -> ApiError {
    let status = match err {
        UpsellError::MissingSiteSlug | UpsellError::SiteNotFound(_) => StatusCode::NOT_FOUND,
        UpsellError::MissingPlanSlug | UpsellError::OfferUnavailable(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        UpsellError::AlreadyDecided(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.user_message().into(),
            code: err.code().into(),
        }),
    )
}

fn not_ready() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "Plan data is still loading. Please try again.".into(),
            code: "NOT_READY".into(),
        }),
    )
}

/// Where a declined upsell sends the buyer
fn thank_you_path(site_slug: &str, receipt_id: Option<ReceiptId>) -> String {
    match receipt_id {
        Some(receipt) => format!("/checkout/thank-you/{site_slug}/{receipt}"),
        None => format!("/checkout/thank-you/{site_slug}"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Screen model for the nudge
pub async fn get_nudge(
    State(state): State<AppState>,
    Path(site_id): Path<u64>,
    Query(query): Query<NudgeQuery>,
) -> Result<Json<UpsellPage>, ApiError> {
    let request = NudgeRequest {
        site_id: SiteId(site_id),
        product: query.product,
        receipt_id: query.receipt_id.map(ReceiptId),
    };

    let props = state.nudge.props(&request);
    if props.site_slug.is_none() {
        return Err(api_error(&UpsellError::SiteNotFound(site_id)));
    }

    Ok(Json(state.nudge.page_for(&request, &props)))
}

/// Accept button
pub async fn accept_upsell(
    State(state): State<AppState>,
    Path(site_id): Path<u64>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ApiError> {
    decide(&state, site_id, Decision::Accept, payload)
}

/// Decline button
pub async fn decline_upsell(
    State(state): State<AppState>,
    Path(site_id): Path<u64>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<DecisionResponse>, ApiError> {
    decide(&state, site_id, Decision::Decline, payload)
}

/// Cart contents
pub async fn list_cart(State(state): State<AppState>) -> Json<Vec<CartEntry>> {
    Json(state.cart.entries())
}

fn decide(
    state: &AppState,
    site_id: u64,
    decision: Decision,
    payload: DecisionRequest,
) -> Result<Json<DecisionResponse>, ApiError> {
    let request = NudgeRequest {
        site_id: SiteId(site_id),
        product: payload.product,
        receipt_id: payload.receipt_id.map(ReceiptId),
    };

    let props = state.nudge.props(&request);
    let site_slug = props
        .site_slug
        .clone()
        .ok_or_else(|| api_error(&UpsellError::SiteNotFound(site_id)))?;

    // Buttons only exist once the plans have loaded
    if props.loading.is_loading() {
        tracing::warn!(
            site = %site_slug,
            decision = decision.as_str(),
            "Decision before plans loaded"
        );
        return Err(not_ready());
    }

    // Without an offer the screen has no buttons to press
    if state.nudge.screen_for(&request, &props).is_placeholder() {
        let err = match props.plan_slug.clone() {
            Some(plan) => UpsellError::OfferUnavailable(plan),
            None => UpsellError::MissingPlanSlug,
        };
        tracing::warn!(
            site = %site_slug,
            decision = decision.as_str(),
            error = %err,
            "Decision without an offer"
        );
        return Err(api_error(&err));
    }

    let navigator = Arc::new(MemoryNavigator::new());
    let decline_navigator = navigator.clone();
    let decline_handler = move |redirect_source: &str, receipt_id: Option<ReceiptId>| {
        let path = thank_you_path(&site_slug, receipt_id);
        tracing::info!(
            redirected_from = %redirect_source,
            path = %path,
            "Redirecting declined upsell"
        );
        decline_navigator.navigate_to(&path);
    };

    let mut dispatcher = state.nudge.dispatcher(
        state.cart.clone(),
        navigator.clone(),
        state.analytics.clone(),
        Arc::new(decline_handler),
    );

    let outcome = dispatcher
        .dispatch(decision, &props.decision_context())
        .map_err(|e| api_error(&e))?;

    Ok(Json(DecisionResponse {
        state: outcome,
        redirect: navigator.current(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        Router,
    };
    use tower::ServiceExt;
    use std::collections::HashMap;
    use upsell_core::{
        memory::{SitePlan, SiteRecord},
        DefaultCurrencyFormatter, MemoryCart, MemoryPlanCatalog, PlanUpgradeNudge,
        TracingAnalyticsSink,
    };

    fn app_with(catalog: MemoryPlanCatalog) -> (Router, Arc<MemoryCart>) {
        let cart = Arc::new(MemoryCart::new());
        let state = AppState {
            nudge: Arc::new(PlanUpgradeNudge::new(
                Arc::new(catalog),
                Arc::new(DefaultCurrencyFormatter),
            )),
            cart: cart.clone(),
            analytics: Arc::new(TracingAnalyticsSink),
        };
        (crate::router(state), cart)
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// Demo catalog plus site 2, whose premium upgrade has no priced plan
    fn catalog_without_offer() -> MemoryPlanCatalog {
        let catalog = MemoryPlanCatalog::demo();
        catalog.upsert_site(SiteRecord {
            id: SiteId(2),
            slug: "unpriced.blog".into(),
            plans: vec![SitePlan {
                product_slug: "business-bundle".into(),
                raw_price: 300.into(),
                discounted_raw_price: 225.into(),
            }],
            upgrades: HashMap::from([("premium".to_string(), "value_bundle".to_string())]),
            default_upgrade: None,
        });
        catalog
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app_with(MemoryPlanCatalog::demo());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, json) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_get_nudge_content() {
        let (app, _) = app_with(MemoryPlanCatalog::demo());
        let request = Request::builder()
            .uri("/api/sites/1/plan-upgrade-nudge?product=premium&receipt_id=12345")
            .body(Body::empty())
            .unwrap();

        let (status, json) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["screen"]["kind"], "content");
        assert_eq!(json["screen"]["show_header"], true);
        assert_eq!(json["screen"]["copy"]["bundle_value"], "$7,392");
        assert_eq!(json["screen"]["copy"]["discount_price"], "$36.00");
    }

    #[tokio::test]
    async fn test_get_nudge_unknown_site() {
        let (app, _) = app_with(MemoryPlanCatalog::demo());
        let request = Request::builder()
            .uri("/api/sites/404/plan-upgrade-nudge")
            .body(Body::empty())
            .unwrap();

        let (status, json) = call(app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "SITE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_accept_adds_to_cart() {
        let (app, cart) = app_with(MemoryPlanCatalog::demo());

        let (status, json) = call(
            app,
            post("/api/sites/1/plan-upgrade-nudge/accept", r#"{"product":"premium"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "accepted");
        assert_eq!(json["redirect"], "/checkout/example.blog");
        assert_eq!(cart.items()[0].product_slug, "value_bundle");
    }

    #[tokio::test]
    async fn test_decline_redirects_to_thank_you() {
        let (app, cart) = app_with(MemoryPlanCatalog::demo());

        let (status, json) = call(
            app,
            post("/api/sites/1/plan-upgrade-nudge/decline", r#"{"receipt_id":12345}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "declined");
        assert_eq!(json["redirect"], "/checkout/thank-you/example.blog/12345");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_decision_while_loading() {
        let catalog = MemoryPlanCatalog::demo();
        catalog.set_products_list_fetching(true);
        let (app, cart) = app_with(catalog);

        let (status, json) = call(app, post("/api/sites/1/plan-upgrade-nudge/accept", "{}")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "NOT_READY");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_accept_unknown_product() {
        let (app, _) = app_with(MemoryPlanCatalog::demo());

        let (status, json) = call(
            app,
            post("/api/sites/1/plan-upgrade-nudge/accept", r#"{"product":"ecommerce"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "MISSING_PLAN_SLUG");
    }

    #[tokio::test]
    async fn test_accept_without_offer_is_rejected() {
        let (app, cart) = app_with(catalog_without_offer());
        let request = Request::builder()
            .uri("/api/sites/2/plan-upgrade-nudge?product=premium")
            .body(Body::empty())
            .unwrap();

        let (status, json) = call(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["screen"]["kind"], "placeholder");

        let (status, json) = call(
            app,
            post("/api/sites/2/plan-upgrade-nudge/accept", r#"{"product":"premium"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "OFFER_UNAVAILABLE");
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_decline_without_offer_is_rejected() {
        let (app, cart) = app_with(catalog_without_offer());

        let (status, json) = call(
            app,
            post(
                "/api/sites/2/plan-upgrade-nudge/decline",
                r#"{"product":"premium","receipt_id":5}"#,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "OFFER_UNAVAILABLE");
        assert!(json["redirect"].is_null());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_thank_you_path() {
        assert_eq!(thank_you_path("example.blog", None), "/checkout/thank-you/example.blog");
        assert_eq!(
            thank_you_path("example.blog", Some(ReceiptId(9))),
            "/checkout/thank-you/example.blog/9"
        );
    }
}
