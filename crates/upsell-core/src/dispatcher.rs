//! Decision Dispatcher
//!
//! One-shot state machine behind the two buttons of the nudge.
//!
//! ```text
//!                     ┌──────────────────┐
//!          accept     │ AwaitingDecision │     decline
//!       ┌─────────────┴──────────────────┴─────────────┐
//!       ▼                                              ▼
//!  cart.add_item(plan)                       analytics.record(decline)
//!  analytics.record(accept)                  decline_handler(tag, receipt)
//!  navigator("/checkout/{site}")                       │
//!       │                                              ▼
//!       ▼                                         ┌──────────┐
//!  ┌──────────┐                                   │ Declined │
//!  │ Accepted │                                   └──────────┘
//!  └──────────┘
//! ```
//!
//! Collaborator calls are fire-and-forget: nothing is retried and nothing is
//! read back from the cart or the navigator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsSink, TracksEvent};
use crate::config::{REDIRECT_SOURCE_TAG, UpsellConfig};
use crate::error::{Result, UpsellError};
use crate::model::{CartLineItem, Decision, DecisionContext, ReceiptId};
use crate::ports::{CartService, DeclineHandler, Navigator};

/// Where the dispatcher is in its lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionState {
    AwaitingDecision,
    Accepted,
    Declined,
}

impl DecisionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DecisionState::AwaitingDecision)
    }
}

/// Forwards the buyer's decision to the cart, analytics and navigation
pub struct DecisionDispatcher {
    cart: Arc<dyn CartService>,
    navigator: Arc<dyn Navigator>,
    analytics: Arc<dyn AnalyticsSink>,
    decline_handler: Arc<dyn DeclineHandler>,
    config: UpsellConfig,
    state: DecisionState,
}

impl DecisionDispatcher {
    pub fn new(
        cart: Arc<dyn CartService>,
        navigator: Arc<dyn Navigator>,
        analytics: Arc<dyn AnalyticsSink>,
        decline_handler: Arc<dyn DeclineHandler>,
    ) -> Self {
        Self {
            cart,
            navigator,
            analytics,
            decline_handler,
            config: UpsellConfig::default(),
            state: DecisionState::AwaitingDecision,
        }
    }

    pub fn with_config(mut self, config: UpsellConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> DecisionState {
        self.state
    }

    /// Apply a decision using the slugs and receipt from `context`
    pub fn dispatch(
        &mut self,
        decision: Decision,
        context: &DecisionContext,
    ) -> Result<DecisionState> {
        match decision {
            Decision::Accept => {
                self.accept(context.site_slug.as_deref(), context.plan_slug.as_deref())
            }
            Decision::Decline => self.decline(context.receipt_id),
        }
    }

    /// Add the plan to the cart and go to checkout.
    ///
    /// Both slugs must be resolved and non-empty; otherwise nothing happens
    /// and an error is returned.
    pub fn accept(
        &mut self,
        site_slug: Option<&str>,
        plan_slug: Option<&str>,
    ) -> Result<DecisionState> {
        self.ensure_awaiting()?;

        let site_slug = non_empty(site_slug).ok_or_else(|| {
            tracing::warn!("Upsell accepted before the site slug was resolved");
            UpsellError::MissingSiteSlug
        })?;
        let plan_slug = non_empty(plan_slug).ok_or_else(|| {
            tracing::warn!(site = %site_slug, "Upsell accepted before the plan slug was resolved");
            UpsellError::MissingPlanSlug
        })?;

        self.cart.add_item(CartLineItem::for_plan(plan_slug));
        self.track(Decision::Accept);

        let destination = self.config.checkout_path_for(site_slug);
        self.navigator.navigate_to(&destination);

        self.state = DecisionState::Accepted;
        tracing::info!(
            site = %site_slug,
            plan = %plan_slug,
            destination = %destination,
            "Upsell accepted"
        );

        Ok(self.state)
    }

    /// Hand the decline to the caller's handler. A missing receipt is fine.
    pub fn decline(&mut self, receipt_id: Option<ReceiptId>) -> Result<DecisionState> {
        self.ensure_awaiting()?;

        self.track(Decision::Decline);
        self.decline_handler
            .handle_decline(REDIRECT_SOURCE_TAG, receipt_id);

        self.state = DecisionState::Declined;
        tracing::info!(receipt_id = ?receipt_id, "Upsell declined");

        Ok(self.state)
    }

    fn ensure_awaiting(&self) -> Result<()> {
        if self.state.is_terminal() {
            tracing::warn!(state = ?self.state, "Ignoring repeated upsell decision");
            return Err(UpsellError::AlreadyDecided(self.state));
        }
        Ok(())
    }

    fn track(&self, decision: Decision) {
        let section = self.config.analytics_section.as_str();
        let event = TracksEvent::upsell_button_click(decision, section);
        self.analytics.record(&event);
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
