//! Analytics Events
//!
//! The nudge emits one tracks event per decision:
//! `calypso_upgrade_plan_upsell_accept_button_click` or
//! `calypso_upgrade_plan_upsell_decline_button_click`.

use serde::{Deserialize, Serialize};

use crate::config::ANALYTICS_SECTION;
use crate::model::Decision;

pub const ACCEPT_BUTTON_CLICK: &str = "calypso_upgrade_plan_upsell_accept_button_click";
pub const DECLINE_BUTTON_CLICK: &str = "calypso_upgrade_plan_upsell_decline_button_click";

/// Properties attached to every upsell event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracksProperties {
    pub section: String,
}

/// A named analytics event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracksEvent {
    pub name: String,
    pub properties: TracksProperties,
}

impl TracksEvent {
    /// Button-click event for a decision
    pub fn upsell_button_click(decision: Decision, section: impl Into<String>) -> Self {
        let name = match decision {
            Decision::Accept => ACCEPT_BUTTON_CLICK,
            Decision::Decline => DECLINE_BUTTON_CLICK,
        };
        Self {
            name: name.into(),
            properties: TracksProperties {
                section: section.into(),
            },
        }
    }
}

/// Destination for analytics events
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: &TracksEvent);
}

/// Sink that writes events to the `tracing` log
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn record(&self, event: &TracksEvent) {
        tracing::info!(
            event = %event.name,
            section = %event.properties.section,
            "Tracks event"
        );
    }
}

impl Default for TracksProperties {
    fn default() -> Self {
        Self {
            section: ANALYTICS_SECTION.into(),
        }
    }
}
