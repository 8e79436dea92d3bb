//! Collaborator Ports
//!
//! The nudge owns no data and performs no I/O itself. Everything it reads or
//! changes goes through these traits, injected by the host.

use crate::model::{CartLineItem, PlanOffer, ReceiptId, SiteId};
use crate::readiness::LoadingState;

/// Read side: site, plan and currency data (Strategy pattern)
///
/// Implement this over whatever store the host keeps products and site plans in.
pub trait PlanCatalog: Send + Sync {
    /// Slug of a site (e.g., "example.blog")
    fn site_slug(&self, site_id: SiteId) -> Option<String>;

    /// Plan to offer as the upgrade for `product` on this site
    fn upgrade_plan_slug(&self, site_id: SiteId, product: Option<&str>) -> Option<String>;

    /// Annual prices of a plan for a site
    fn plan_offer(&self, site_id: SiteId, plan_slug: &str) -> Option<PlanOffer>;

    /// Loading flags for the products list and the site's plans
    fn loading_state(&self, site_id: SiteId) -> LoadingState;
}

/// Shopping cart
pub trait CartService: Send + Sync {
    fn add_item(&self, item: CartLineItem);
}

/// Page navigation
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

/// Caller-supplied handling of a declined offer
pub trait DeclineHandler: Send + Sync {
    fn handle_decline(&self, redirect_source: &str, receipt_id: Option<ReceiptId>);
}

impl<F> DeclineHandler for F
where
    F: Fn(&str, Option<ReceiptId>) + Send + Sync,
{
    fn handle_decline(&self, redirect_source: &str, receipt_id: Option<ReceiptId>) {
        self(redirect_source, receipt_id);
    }
}
