//! Error Types for the Upsell Core

use thiserror::Error;

use crate::dispatcher::DecisionState;

pub type Result<T> = std::result::Result<T, UpsellError>;

#[derive(Error, Debug)]
pub enum UpsellError {
    #[error("Site slug is not resolved")]
    MissingSiteSlug,

    #[error("Plan slug is not resolved")]
    MissingPlanSlug,

    #[error("Decision already taken: {0:?}")]
    AlreadyDecided(DecisionState),

    #[error("No offer available for plan: {0}")]
    OfferUnavailable(String),

    #[error("Site not found: {0}")]
    SiteNotFound(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UpsellError {
    /// Short machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            UpsellError::MissingSiteSlug => "MISSING_SITE_SLUG",
            UpsellError::MissingPlanSlug => "MISSING_PLAN_SLUG",
            UpsellError::AlreadyDecided(_) => "ALREADY_DECIDED",
            UpsellError::OfferUnavailable(_) => "OFFER_UNAVAILABLE",
            UpsellError::SiteNotFound(_) => "SITE_NOT_FOUND",
            UpsellError::Config(_) => "CONFIG_ERROR",
            UpsellError::Catalog(_) | UpsellError::Serialization(_) => "CATALOG_ERROR",
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            UpsellError::MissingSiteSlug | UpsellError::SiteNotFound(_) => {
                "We couldn't find the site for this offer."
            }
            UpsellError::MissingPlanSlug | UpsellError::OfferUnavailable(_) => {
                "This offer is not available for your site."
            }
            UpsellError::AlreadyDecided(_) => "You've already responded to this offer.",
            _ => "An error occurred processing your request.",
        }
    }
}
