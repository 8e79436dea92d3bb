//! Domain Models
//!
//! Data handed to the nudge by the plan catalog, and the values it hands
//! back to the cart. All monetary values are `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Numeric site identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u64);

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the purchase that was just completed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(pub u64);

impl std::fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Prices of the offered plan, as supplied by the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOffer {
    /// Full annual price
    pub plan_raw_price: Decimal,

    /// One-time discounted annual price
    pub plan_discounted_raw_price: Decimal,

    /// ISO 4217 currency code (e.g., "USD")
    pub currency_code: String,
}

impl PlanOffer {
    pub fn new(
        plan_raw_price: Decimal,
        plan_discounted_raw_price: Decimal,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            plan_raw_price,
            plan_discounted_raw_price,
            currency_code: currency_code.into().to_uppercase(),
        }
    }
}

/// The buyer's answer to the offer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accept,
    Decline,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accept => "accept",
            Decision::Decline => "decline",
        }
    }
}

/// Everything a decision needs from the surrounding page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionContext {
    /// Slug of the site being upgraded (required on accept)
    #[serde(default)]
    pub site_slug: Option<String>,

    /// Slug of the offered plan (required on accept)
    #[serde(default)]
    pub plan_slug: Option<String>,

    /// Receipt of the purchase that led here (tags the decline path)
    #[serde(default)]
    pub receipt_id: Option<ReceiptId>,
}

impl DecisionContext {
    pub fn new(site_slug: impl Into<String>, plan_slug: impl Into<String>) -> Self {
        Self {
            site_slug: Some(site_slug.into()),
            plan_slug: Some(plan_slug.into()),
            receipt_id: None,
        }
    }

    pub fn with_receipt(mut self, receipt_id: Option<ReceiptId>) -> Self {
        self.receipt_id = receipt_id;
        self
    }
}

/// Cart line item for a plan
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product slug understood by the cart
    pub product_slug: String,

    /// Plans added from the nudge are always paid
    pub free_trial: bool,
}

impl CartLineItem {
    /// Line item for a plan slug
    pub fn for_plan(plan_slug: impl Into<String>) -> Self {
        Self {
            product_slug: plan_slug.into(),
            free_trial: false,
        }
    }
}
