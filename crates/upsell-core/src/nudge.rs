//! Plan Upgrade Nudge
//!
//! Wires the catalog, the pricing deriver and the currency formatter into
//! the screen the host renders, and builds dispatchers for the two buttons.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analytics::AnalyticsSink;
use crate::config::{PAGE_TITLE, PAGE_VIEW_PATH, UpsellConfig};
use crate::currency::CurrencyFormatter;
use crate::dispatcher::DecisionDispatcher;
use crate::model::{DecisionContext, ReceiptId, SiteId};
use crate::ports::{CartService, DeclineHandler, Navigator, PlanCatalog};
use crate::pricing::{PricingDeriver, UpsellPricing};
use crate::readiness::{DataQuery, LoadingState};

/// What the host asked to show
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NudgeRequest {
    pub site_id: SiteId,

    /// Product path segment (e.g., "premium")
    #[serde(default)]
    pub product: Option<String>,

    #[serde(default)]
    pub receipt_id: Option<ReceiptId>,
}

impl NudgeRequest {
    pub fn new(site_id: SiteId) -> Self {
        Self {
            site_id,
            product: None,
            receipt_id: None,
        }
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    pub fn with_receipt(mut self, receipt_id: ReceiptId) -> Self {
        self.receipt_id = Some(receipt_id);
        self
    }
}

/// Values resolved from the catalog for one request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NudgeProps {
    pub site_slug: Option<String>,
    pub plan_slug: Option<String>,
    pub loading: LoadingState,
    pub receipt_id: Option<ReceiptId>,
}

impl NudgeProps {
    pub fn decision_context(&self) -> DecisionContext {
        DecisionContext {
            site_slug: self.site_slug.clone(),
            plan_slug: self.plan_slug.clone(),
            receipt_id: self.receipt_id,
        }
    }
}

/// Formatted amounts used in the copy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellCopy {
    /// Bundle value without decimals (e.g., "$7,700")
    pub bundle_value: String,
    pub full_price: String,
    pub discount_price: String,
}

/// Screen selected for the current data
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpsellScreen {
    /// Data still loading; `show_header` mirrors the header card
    Placeholder { show_header: bool },

    Content {
        /// "Hold tight, your site is being upgraded" card, only after a purchase
        show_header: bool,
        pricing: UpsellPricing,
        copy: UpsellCopy,
    },
}

impl UpsellScreen {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, UpsellScreen::Placeholder { .. })
    }
}

/// Page-level metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellPage {
    pub title: String,
    pub page_view_path: String,
    pub queries: Vec<DataQuery>,
    pub screen: UpsellScreen,
}

/// The post-purchase plan upgrade nudge
pub struct PlanUpgradeNudge {
    catalog: Arc<dyn PlanCatalog>,
    formatter: Arc<dyn CurrencyFormatter>,
    pricing: PricingDeriver,
    config: UpsellConfig,
}

impl PlanUpgradeNudge {
    pub fn new(catalog: Arc<dyn PlanCatalog>, formatter: Arc<dyn CurrencyFormatter>) -> Self {
        Self {
            catalog,
            formatter,
            pricing: PricingDeriver::new(),
            config: UpsellConfig::default(),
        }
    }

    pub fn with_config(mut self, config: UpsellConfig) -> Self {
        self.pricing = PricingDeriver::with_multiplier(config.bundle_multiplier);
        self.config = config;
        self
    }

    pub fn config(&self) -> &UpsellConfig {
        &self.config
    }

    /// Resolve slugs and loading flags for a request
    pub fn props(&self, request: &NudgeRequest) -> NudgeProps {
        let site_id = request.site_id;
        NudgeProps {
            site_slug: self.catalog.site_slug(site_id),
            plan_slug: self
                .catalog
                .upgrade_plan_slug(site_id, request.product.as_deref()),
            loading: self.catalog.loading_state(site_id),
            receipt_id: request.receipt_id,
        }
    }

    /// Pick the screen. Prices are only looked up once the catalog is ready.
    pub fn screen(&self, request: &NudgeRequest) -> UpsellScreen {
        let props = self.props(request);
        self.screen_for(request, &props)
    }

    /// Full page model: metadata, pending queries and the screen
    pub fn page(&self, request: &NudgeRequest) -> UpsellPage {
        let props = self.props(request);
        self.page_for(request, &props)
    }

    /// Page model from props the caller already resolved
    pub fn page_for(&self, request: &NudgeRequest, props: &NudgeProps) -> UpsellPage {
        UpsellPage {
            title: PAGE_TITLE.into(),
            page_view_path: PAGE_VIEW_PATH.into(),
            queries: props.loading.missing_data(),
            screen: self.screen_for(request, props),
        }
    }

    /// Dispatcher for this nudge's buttons
    pub fn dispatcher(
        &self,
        cart: Arc<dyn CartService>,
        navigator: Arc<dyn Navigator>,
        analytics: Arc<dyn AnalyticsSink>,
        decline_handler: Arc<dyn DeclineHandler>,
    ) -> DecisionDispatcher {
        DecisionDispatcher::new(cart, navigator, analytics, decline_handler)
            .with_config(self.config.clone())
    }

    /// Screen for already-resolved props
    pub fn screen_for(&self, request: &NudgeRequest, props: &NudgeProps) -> UpsellScreen {
        let show_header = request.receipt_id.is_some();

        if props.loading.is_loading() {
            return UpsellScreen::Placeholder { show_header };
        }

        let offer = props
            .plan_slug
            .as_deref()
            .and_then(|plan| self.catalog.plan_offer(request.site_id, plan));

        let Some(offer) = offer else {
            tracing::debug!(
                site_id = %request.site_id,
                plan = ?props.plan_slug,
                "No plan offer available, keeping placeholders"
            );
            return UpsellScreen::Placeholder { show_header };
        };

        let pricing = self.pricing.derive(&offer);
        let copy = self.copy(&pricing);

        UpsellScreen::Content {
            show_header,
            pricing,
            copy,
        }
    }

    fn copy(&self, pricing: &UpsellPricing) -> UpsellCopy {
        let code = pricing.currency_code.as_str();
        UpsellCopy {
            bundle_value: self.formatter.format(pricing.bundle_value, code, Some(0)),
            full_price: self.formatter.format(pricing.full_price, code, None),
            discount_price: self.formatter.format(pricing.discounted_price, code, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::TracingAnalyticsSink;
    use crate::currency::DefaultCurrencyFormatter;
    use crate::memory::{
        CatalogData, MemoryCart, MemoryNavigator, MemoryPlanCatalog, SitePlan, SiteRecord,
    };
    use crate::model::{CartLineItem, PlanOffer};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps the memory catalog and counts offer lookups
    struct CountingCatalog {
        inner: MemoryPlanCatalog,
        offer_lookups: AtomicUsize,
    }

    impl PlanCatalog for CountingCatalog {
        fn site_slug(&self, site_id: SiteId) -> Option<String> {
            self.inner.site_slug(site_id)
        }

        fn upgrade_plan_slug(&self, site_id: SiteId, product: Option<&str>) -> Option<String> {
            self.inner.upgrade_plan_slug(site_id, product)
        }

        fn plan_offer(&self, site_id: SiteId, plan_slug: &str) -> Option<PlanOffer> {
            self.offer_lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.plan_offer(site_id, plan_slug)
        }

        fn loading_state(&self, site_id: SiteId) -> LoadingState {
            self.inner.loading_state(site_id)
        }
    }

    fn catalog() -> Arc<CountingCatalog> {
        let data = CatalogData {
            currency_code: "USD".into(),
            products: vec!["premium".into()],
            sites: vec![SiteRecord {
                id: SiteId(10),
                slug: "example-site".into(),
                plans: vec![SitePlan {
                    product_slug: "premium".into(),
                    raw_price: dec!(100),
                    discounted_raw_price: dec!(40),
                }],
                upgrades: HashMap::new(),
                default_upgrade: Some("premium".into()),
            }],
        };
        Arc::new(CountingCatalog {
            inner: MemoryPlanCatalog::new(data),
            offer_lookups: AtomicUsize::new(0),
        })
    }

    fn nudge(catalog: &Arc<CountingCatalog>) -> PlanUpgradeNudge {
        PlanUpgradeNudge::new(catalog.clone(), Arc::new(DefaultCurrencyFormatter))
    }

    #[test]
    fn test_content_screen() {
        let catalog = catalog();
        let request = NudgeRequest::new(SiteId(10)).with_receipt(ReceiptId(12345));

        let screen = nudge(&catalog).screen(&request);

        let UpsellScreen::Content { show_header, pricing, copy } = screen else {
            panic!("expected content screen");
        };
        assert!(show_header);
        assert_eq!(pricing.bundle_value, dec!(7700));
        assert_eq!(copy.bundle_value, "$7,700");
        assert_eq!(copy.full_price, "$100.00");
        assert_eq!(copy.discount_price, "$40.00");
    }

    #[test]
    fn test_loading_skips_pricing() {
        let catalog = catalog();
        catalog.inner.set_products_list_fetching(true);

        let screen = nudge(&catalog).screen(&NudgeRequest::new(SiteId(10)));

        assert_eq!(screen, UpsellScreen::Placeholder { show_header: false });
        assert_eq!(catalog.offer_lookups.load(Ordering::SeqCst), 0);

        catalog.inner.set_products_list_fetching(false);
        catalog.inner.set_site_plans_requesting(SiteId(10), true);
        let request = NudgeRequest::new(SiteId(10)).with_receipt(ReceiptId(1));
        let screen = nudge(&catalog).screen(&request);

        assert_eq!(screen, UpsellScreen::Placeholder { show_header: true });
        assert_eq!(catalog.offer_lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_plan_keeps_placeholder() {
        let catalog = catalog();
        let request = NudgeRequest::new(SiteId(10)).with_product("ecommerce");

        assert!(nudge(&catalog).screen(&request).is_placeholder());
    }

    #[test]
    fn test_page_metadata() {
        let catalog = catalog();
        let page = nudge(&catalog).page(&NudgeRequest::new(SiteId(10)));

        assert_eq!(page.title, "Checkout ‹ Plan Upgrade");
        assert_eq!(page.page_view_path, "/checkout/:site/plan-upgrade-nudge/:receipt_id");
        assert!(page.queries.is_empty());
        assert!(!page.screen.is_placeholder());

        let unknown = nudge(&catalog).page(&NudgeRequest::new(SiteId(11)));
        assert_eq!(unknown.queries, vec![DataQuery::SitePlans]);
    }

    #[test]
    fn test_page_for_reuses_props() {
        let catalog = catalog();
        let nudge = nudge(&catalog);
        let request = NudgeRequest::new(SiteId(10));
        let props = nudge.props(&request);

        let page = nudge.page_for(&request, &props);

        assert_eq!(page, nudge.page(&request));
        assert_eq!(page.screen, nudge.screen_for(&request, &props));
    }

    #[test]
    fn test_custom_multiplier_config() {
        let catalog = catalog();
        let nudge = nudge(&catalog).with_config(UpsellConfig {
            bundle_multiplier: dec!(10),
            ..UpsellConfig::default()
        });

        let screen = nudge.screen(&NudgeRequest::new(SiteId(10)));
        let UpsellScreen::Content { pricing, .. } = screen else {
            panic!("expected content screen");
        };
        assert_eq!(pricing.bundle_value, dec!(1000));
    }

    #[test]
    fn test_props_drive_accept() {
        let catalog = catalog();
        let nudge = nudge(&catalog);
        let props = nudge.props(&NudgeRequest::new(SiteId(10)));

        let cart = Arc::new(MemoryCart::new());
        let navigator = Arc::new(MemoryNavigator::new());
        let mut dispatcher = nudge.dispatcher(
            cart.clone(),
            navigator.clone(),
            Arc::new(TracingAnalyticsSink),
            Arc::new(|_: &str, _: Option<ReceiptId>| {}),
        );

        let context = props.decision_context();
        dispatcher
            .accept(context.site_slug.as_deref(), context.plan_slug.as_deref())
            .unwrap();

        assert_eq!(cart.items(), vec![CartLineItem::for_plan("premium")]);
        assert_eq!(navigator.current().as_deref(), Some("/checkout/example-site"));
    }
}
