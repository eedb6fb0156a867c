use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: usize,
    pub low_stock_count: usize,
    /// Sum of receipt totals since the first of the current month (UTC).
    pub monthly_spend: Decimal,
}
