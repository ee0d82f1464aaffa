//! Back-office dashboard summary.

use serde::{Deserialize, Serialize};

use crate::model::Order;
use crate::types::Price;

/// Headline numbers shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: u64,
    pub total_revenue: Price,
    pub total_products: u64,
    pub total_customers: u64,
    #[serde(default)]
    pub recent_orders: Vec<Order>,
}
