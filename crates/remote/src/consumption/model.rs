//! Row models for the `consumption_logs` table.

use chrono::{DateTime, Utc};
use givd_core::consumption::{ConsumptionEvent, NewConsumptionEvent};
use serde::{Deserialize, Serialize};

/// Row as returned by the table API and carried in realtime payloads
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ConsumptionRow {
    pub id: String,
    pub user_id: String,
    pub product_name: String,
    pub quantity_used: f64,
    pub timestamp: DateTime<Utc>,
}

/// Row for inserting a consumption event
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewConsumptionRow {
    pub user_id: String,
    pub product_name: String,
    pub quantity_used: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<ConsumptionRow> for ConsumptionEvent {
    fn from(row: ConsumptionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_name: row.product_name,
            quantity_used: row.quantity_used,
            timestamp: row.timestamp,
        }
    }
}

impl NewConsumptionRow {
    /// Builds the insert row; a missing timestamp is stamped with `now`.
    pub fn new(owner: &str, domain: NewConsumptionEvent, now: DateTime<Utc>) -> Self {
        Self {
            user_id: owner.to_string(),
            product_name: domain.product_name,
            quantity_used: domain.quantity_used,
            timestamp: domain.timestamp.unwrap_or(now),
        }
    }
}
