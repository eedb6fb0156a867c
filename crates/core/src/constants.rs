/// Default number of events held by the live consumption feed
pub const DEFAULT_FEED_LIMIT: usize = 20;

/// Default unit for new products
pub const DEFAULT_PRODUCT_UNIT: &str = "pcs";

/// Default category for new products
pub const DEFAULT_PRODUCT_CATEGORY: &str = "Général";

/// Currency used for receipts and plan prices
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Number of days covered by the consumption trend chart
pub const TREND_WINDOW_DAYS: i64 = 7;

/// Remote table names
pub const PRODUCTS_TABLE: &str = "products";
pub const RECEIPTS_TABLE: &str = "receipts";
pub const CONSUMPTION_TABLE: &str = "consumption_logs";
