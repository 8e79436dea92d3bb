//! Readiness Gate
//!
//! Pricing-dependent content is only built once both the products list and
//! the site's plans have loaded.

use serde::{Deserialize, Serialize};

/// True while either data set is still being fetched
pub fn is_loading(products_list_fetching: bool, site_plans_requesting: bool) -> bool {
    products_list_fetching || site_plans_requesting
}

/// Data the host still has to request before the nudge can price anything
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuery {
    ProductsList,
    SitePlans,
}

/// Loading flags reported by the plan catalog
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingState {
    pub products_list_fetching: bool,
    pub site_plans_requesting: bool,
    pub has_products_list: bool,
    pub has_site_plans: bool,
}

impl LoadingState {
    /// Everything fetched and present
    pub fn loaded() -> Self {
        Self {
            products_list_fetching: false,
            site_plans_requesting: false,
            has_products_list: true,
            has_site_plans: true,
        }
    }

    pub fn is_loading(&self) -> bool {
        is_loading(self.products_list_fetching, self.site_plans_requesting)
    }

    pub fn is_ready(&self) -> bool {
        !self.is_loading()
    }

    /// Queries to issue for data that is absent
    pub fn missing_data(&self) -> Vec<DataQuery> {
        let mut queries = Vec::new();
        if !self.has_products_list {
            queries.push(DataQuery::ProductsList);
        }
        if !self.has_site_plans {
            queries.push(DataQuery::SitePlans);
        }
        queries
    }
}
