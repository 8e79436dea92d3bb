//! Pricing Deriver
//!
//! Turns a [`PlanOffer`] into the three figures shown on the nudge: the full
//! price, the discounted price, and the bundle value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::BUNDLE_VALUE_MULTIPLIER;
use crate::model::PlanOffer;

/// Bundle value of a plan: its raw annual price times the fixed multiplier.
///
/// No bounds checking: a negative price gives a negative value. The product
/// saturates at `Decimal::MAX`/`Decimal::MIN` instead of overflowing.
pub fn compute_bundle_value(plan_raw_price: Decimal) -> Decimal {
    PricingDeriver::new().bundle_value(plan_raw_price)
}

/// Numbers displayed on the nudge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellPricing {
    pub full_price: Decimal,
    pub discounted_price: Decimal,
    pub bundle_value: Decimal,
    pub currency_code: String,
}

impl UpsellPricing {
    /// Amount saved by taking the offer (negative if the "discount" isn't one)
    pub fn savings(&self) -> Decimal {
        self.full_price - self.discounted_price
    }
}

/// Derives display pricing from a plan offer
#[derive(Clone, Debug)]
pub struct PricingDeriver {
    multiplier: Decimal,
}

impl Default for PricingDeriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingDeriver {
    pub fn new() -> Self {
        Self {
            multiplier: Decimal::from(BUNDLE_VALUE_MULTIPLIER),
        }
    }

    /// Use a non-default multiplier
    pub fn with_multiplier(multiplier: Decimal) -> Self {
        Self { multiplier }
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    pub fn bundle_value(&self, plan_raw_price: Decimal) -> Decimal {
        plan_raw_price.saturating_mul(self.multiplier)
    }

    /// Derive all display figures. The discounted price is passed through
    /// unvalidated.
    pub fn derive(&self, offer: &PlanOffer) -> UpsellPricing {
        UpsellPricing {
            full_price: offer.plan_raw_price,
            discounted_price: offer.plan_discounted_raw_price,
            bundle_value: self.bundle_value(offer.plan_raw_price),
            currency_code: offer.currency_code.clone(),
        }
    }
}
