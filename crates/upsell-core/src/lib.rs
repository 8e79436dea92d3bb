//! # upsell-core
//!
//! Pricing and decision logic for the post-purchase plan upgrade nudge: the
//! screen that offers a buyer a discounted premium plan right after checkout.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   LoadingState   ┌──────────────────┐
//! │ PlanCatalog  │─────────────────▶│ PlanUpgradeNudge │──▶ UpsellScreen
//! │  (external)  │   PlanOffer      │  readiness gate  │    (placeholder
//! └──────────────┘─────────────────▶│  PricingDeriver  │     or content)
//!                                   └────────┬─────────┘
//!                                            │ dispatcher()
//!                                            ▼
//!                                  ┌────────────────────┐
//!                 accept ─────────▶│ DecisionDispatcher │◀───────── decline
//!                                  └─────────┬──────────┘
//!                     CartService · AnalyticsSink · Navigator · DeclineHandler
//! ```
//!
//! Every collaborator is injected; the crate owns no global state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use upsell_core::{
//!     DefaultCurrencyFormatter, MemoryPlanCatalog, NudgeRequest, PlanUpgradeNudge, SiteId,
//! };
//!
//! let nudge = PlanUpgradeNudge::new(
//!     Arc::new(MemoryPlanCatalog::demo()),
//!     Arc::new(DefaultCurrencyFormatter),
//! );
//! let screen = nudge.screen(&NudgeRequest::new(SiteId(1)).with_product("premium"));
//! ```

pub mod analytics;
pub mod config;
pub mod currency;
pub mod dispatcher;
pub mod error;
pub mod memory;
pub mod model;
pub mod nudge;
pub mod ports;
pub mod pricing;
pub mod readiness;

pub use analytics::{AnalyticsSink, TracingAnalyticsSink, TracksEvent};
pub use config::{BUNDLE_VALUE_MULTIPLIER, REDIRECT_SOURCE_TAG, UpsellConfig};
pub use currency::{CurrencyFormatter, DefaultCurrencyFormatter, format_currency};
pub use dispatcher::{DecisionDispatcher, DecisionState};
pub use error::{Result, UpsellError};
pub use memory::{MemoryCart, MemoryNavigator, MemoryPlanCatalog};
pub use model::{CartLineItem, Decision, DecisionContext, PlanOffer, ReceiptId, SiteId};
pub use nudge::{NudgeRequest, PlanUpgradeNudge, UpsellCopy, UpsellPage, UpsellScreen};
pub use ports::{CartService, DeclineHandler, Navigator, PlanCatalog};
pub use pricing::{PricingDeriver, UpsellPricing, compute_bundle_value};
pub use readiness::{LoadingState, is_loading};
