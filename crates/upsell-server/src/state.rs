//! Application State

use std::sync::Arc;

use upsell_core::{AnalyticsSink, MemoryCart, PlanUpgradeNudge};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Nudge bound to the plan catalog and currency formatter
    pub nudge: Arc<PlanUpgradeNudge>,

    /// Cart that accepted upsells are added to
    pub cart: Arc<MemoryCart>,

    /// Destination for button-click events
    pub analytics: Arc<dyn AnalyticsSink>,
}
