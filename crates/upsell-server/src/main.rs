//! Plan Upgrade Nudge HTTP Server
//!
//! Axum-based host for the post-purchase upsell: serves the screen model as
//! JSON and turns accept/decline clicks into cart updates and redirects.

mod handlers;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use upsell_core::{
    DefaultCurrencyFormatter, MemoryCart, MemoryPlanCatalog, PlanUpgradeNudge,
    TracingAnalyticsSink, UpsellConfig,
};

use crate::handlers::{accept_upsell, decline_upsell, get_nudge, health_check, list_cart};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = UpsellConfig::from_env()?;
    tracing::info!(
        multiplier = %config.bundle_multiplier,
        checkout_path = %config.checkout_path,
        "Loaded upsell configuration"
    );

    // Plan catalog
    let catalog = match std::env::var("UPSELL_CATALOG_PATH") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading catalog {path}"))?;
            tracing::info!(path = %path, "✓ Loaded plan catalog");
            MemoryPlanCatalog::from_json(&json)?
        }
        Err(_) => {
            tracing::warn!("⚠ UPSELL_CATALOG_PATH not set - using demo catalog");
            MemoryPlanCatalog::demo()
        }
    };

    let nudge = PlanUpgradeNudge::new(Arc::new(catalog), Arc::new(DefaultCurrencyFormatter))
        .with_config(config);

    let state = AppState {
        nudge: Arc::new(nudge),
        cart: Arc::new(MemoryCart::new()),
        analytics: Arc::new(TracingAnalyticsSink),
    };

    let app = router(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 upsell-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                                        - Health check");
    tracing::info!("  GET  /api/sites/{{site_id}}/plan-upgrade-nudge         - Screen model");
    tracing::info!("  POST /api/sites/{{site_id}}/plan-upgrade-nudge/accept  - Accept offer");
    tracing::info!("  POST /api/sites/{{site_id}}/plan-upgrade-nudge/decline - Decline offer");
    tracing::info!("  GET  /api/cart                                      - Cart contents");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))

        // Nudge
        .route("/api/sites/{site_id}/plan-upgrade-nudge", get(get_nudge))
        .route("/api/sites/{site_id}/plan-upgrade-nudge/accept", post(accept_upsell))
        .route("/api/sites/{site_id}/plan-upgrade-nudge/decline", post(decline_upsell))

        // Cart
        .route("/api/cart", get(list_cart))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
