//! Upsell Configuration
//!
//! Business constants of the nudge and their environment overrides.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UpsellError};

/// Fixed marketing multiplier: "worth" of the included premium designs
/// relative to the plan's annual price.
pub const BUNDLE_VALUE_MULTIPLIER: u32 = 77;

/// Tag handed to the decline handler so the next page knows where the user came from
pub const REDIRECT_SOURCE_TAG: &str = "plan-upgrade-nudge";

/// Section property attached to every analytics event
pub const ANALYTICS_SECTION: &str = "checkout";

/// Prefix of the checkout path; the site slug is appended
pub const CHECKOUT_PATH: &str = "/checkout";

/// Page-view path template
pub const PAGE_VIEW_PATH: &str = "/checkout/:site/plan-upgrade-nudge/:receipt_id";

/// Document title of the nudge page
pub const PAGE_TITLE: &str = "Checkout ‹ Plan Upgrade";

/// Runtime configuration for the nudge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsellConfig {
    /// Multiplier applied to the raw annual price to get the bundle value
    pub bundle_multiplier: Decimal,

    /// `section` property of analytics events
    pub analytics_section: String,

    /// Checkout path prefix used on accept
    pub checkout_path: String,
}

impl Default for UpsellConfig {
    fn default() -> Self {
        Self {
            bundle_multiplier: Decimal::from(BUNDLE_VALUE_MULTIPLIER),
            analytics_section: ANALYTICS_SECTION.into(),
            checkout_path: CHECKOUT_PATH.into(),
        }
    }
}

impl UpsellConfig {
    /// Create from environment variables, falling back to the defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("UPSELL_BUNDLE_MULTIPLIER") {
            config.bundle_multiplier = raw.trim().parse().map_err(|_| {
                UpsellError::Config(format!("UPSELL_BUNDLE_MULTIPLIER is not a decimal: {raw}"))
            })?;
        }
        if let Some(section) = lookup("UPSELL_ANALYTICS_SECTION") {
            config.analytics_section = section;
        }
        if let Some(path) = lookup("UPSELL_CHECKOUT_PATH") {
            config.checkout_path = path.trim_end_matches('/').to_string();
        }

        Ok(config)
    }

    /// Checkout destination for a site
    pub fn checkout_path_for(&self, site_slug: &str) -> String {
        format!("{}/{}", self.checkout_path, site_slug)
    }
}
