//! In-Memory Collaborators
//!
//! Cart, navigator and plan catalog kept in process memory. Used by the demo
//! server and by tests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::error::{Result, UpsellError};
use crate::model::{CartLineItem, PlanOffer, SiteId};
use crate::ports::{CartService, Navigator, PlanCatalog};
use crate::readiness::LoadingState;

/// A line item as stored in the memory cart
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: Uuid,
    pub item: CartLineItem,
    pub added_at: DateTime<Utc>,
}

/// In-memory cart (for development)
#[derive(Default)]
pub struct MemoryCart {
    entries: RwLock<Vec<CartEntry>>,
}

impl MemoryCart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<CartEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn items(&self) -> Vec<CartLineItem> {
        self.entries().into_iter().map(|e| e.item).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CartService for MemoryCart {
    fn add_item(&self, item: CartLineItem) {
        let entry = CartEntry {
            id: Uuid::new_v4(),
            item,
            added_at: Utc::now(),
        };
        tracing::debug!(
            entry_id = %entry.id,
            product = %entry.item.product_slug,
            "Added cart item"
        );
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

/// Navigator that remembers every path it was sent to
#[derive(Default)]
pub struct MemoryNavigator {
    history: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent destination
    pub fn current(&self) -> Option<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate_to(&self, path: &str) {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}

/// Annual prices of one plan on a site
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SitePlan {
    pub product_slug: String,
    pub raw_price: Decimal,
    pub discounted_raw_price: Decimal,
}

/// A site and the plans it can buy
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: SiteId,
    pub slug: String,

    #[serde(default)]
    pub plans: Vec<SitePlan>,

    /// Product path (e.g., "premium") to the plan slug offered for it
    #[serde(default)]
    pub upgrades: HashMap<String, String>,

    /// Plan offered when no product is named
    #[serde(default)]
    pub default_upgrade: Option<String>,
}

/// Serializable catalog contents
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogData {
    /// Currency of the current user
    pub currency_code: String,

    /// Product slugs known to the store
    #[serde(default)]
    pub products: Vec<String>,

    #[serde(default)]
    pub sites: Vec<SiteRecord>,
}

/// In-memory plan catalog with controllable loading flags
pub struct MemoryPlanCatalog {
    data: RwLock<CatalogData>,
    products_list_fetching: RwLock<bool>,
    requesting_plans: RwLock<HashSet<SiteId>>,
}

impl MemoryPlanCatalog {
    pub fn new(data: CatalogData) -> Self {
        Self {
            data: RwLock::new(data),
            products_list_fetching: RwLock::new(false),
            requesting_plans: RwLock::new(HashSet::new()),
        }
    }

    /// Load catalog contents from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let data: CatalogData = serde_json::from_str(json)?;
        if data.currency_code.trim().is_empty() {
            return Err(UpsellError::Catalog("currency_code is empty".into()));
        }
        Ok(Self::new(data))
    }

    /// Static demo catalog: one USD site with premium and business upgrades
    pub fn demo() -> Self {
        let plans = vec![
            SitePlan {
                product_slug: "value_bundle".into(),
                raw_price: dec!(96),
                discounted_raw_price: dec!(36),
            },
            SitePlan {
                product_slug: "business-bundle".into(),
                raw_price: dec!(300),
                discounted_raw_price: dec!(225),
            },
        ];

        Self::new(CatalogData {
            currency_code: "USD".into(),
            products: plans.iter().map(|p| p.product_slug.clone()).collect(),
            sites: vec![SiteRecord {
                id: SiteId(1),
                slug: "example.blog".into(),
                plans,
                upgrades: HashMap::from([
                    ("premium".to_string(), "value_bundle".to_string()),
                    ("business".to_string(), "business-bundle".to_string()),
                ]),
                default_upgrade: Some("value_bundle".into()),
            }],
        })
    }

    pub fn set_products_list_fetching(&self, fetching: bool) {
        *self
            .products_list_fetching
            .write()
            .unwrap_or_else(PoisonError::into_inner) = fetching;
    }

    pub fn set_site_plans_requesting(&self, site_id: SiteId, requesting: bool) {
        let mut requesting_plans = self
            .requesting_plans
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if requesting {
            requesting_plans.insert(site_id);
        } else {
            requesting_plans.remove(&site_id);
        }
    }

    /// Add or replace a site
    pub fn upsert_site(&self, site: SiteRecord) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.sites.retain(|s| s.id != site.id);
        data.sites.push(site);
    }

    fn with_site<T>(
        &self,
        site_id: SiteId,
        f: impl FnOnce(&SiteRecord, &CatalogData) -> Option<T>,
    ) -> Option<T> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let site = data.sites.iter().find(|s| s.id == site_id)?;
        f(site, &*data)
    }
}

impl PlanCatalog for MemoryPlanCatalog {
    fn site_slug(&self, site_id: SiteId) -> Option<String> {
        self.with_site(site_id, |site, _| Some(site.slug.clone()))
    }

    fn upgrade_plan_slug(&self, site_id: SiteId, product: Option<&str>) -> Option<String> {
        self.with_site(site_id, |site, _| match product {
            Some(product) => site.upgrades.get(product).cloned().or_else(|| {
                site.plans
                    .iter()
                    .find(|p| p.product_slug == product)
                    .map(|p| p.product_slug.clone())
            }),
            None => site.default_upgrade.clone(),
        })
    }

    fn plan_offer(&self, site_id: SiteId, plan_slug: &str) -> Option<PlanOffer> {
        tracing::debug!(site_id = %site_id, plan = %plan_slug, "Plan offer lookup");
        self.with_site(site_id, |site, data| {
            site.plans
                .iter()
                .find(|p| p.product_slug == plan_slug)
                .map(|p| {
                    PlanOffer::new(p.raw_price, p.discounted_raw_price, data.currency_code.as_str())
                })
        })
    }

    fn loading_state(&self, site_id: SiteId) -> LoadingState {
        let products_list_fetching = *self
            .products_list_fetching
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let site_plans_requesting = self
            .requesting_plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&site_id);

        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        let has_site_plans = data
            .sites
            .iter()
            .any(|s| s.id == site_id && !s.plans.is_empty());

        LoadingState {
            products_list_fetching,
            site_plans_requesting,
            has_products_list: !data.products.is_empty(),
            has_site_plans,
        }
    }
}
