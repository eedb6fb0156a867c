//! Row models for the `receipts` table.

use chrono::{DateTime, NaiveDate, Utc};
use givd_core::receipts::{NewReceipt, Receipt, ReceiptItem};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Row as returned by the table API.
///
/// Items are stored as a JSON column.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReceiptRow {
    pub id: String,
    pub user_id: String,
    pub store_name: String,
    pub total_amount: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub items_json: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Row for inserting a receipt
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewReceiptRow {
    pub user_id: String,
    pub store_name: String,
    pub total_amount: Decimal,
    pub purchase_date: NaiveDate,
    pub items_json: Vec<ReceiptItem>,
}

impl From<ReceiptRow> for Receipt {
    fn from(row: ReceiptRow) -> Self {
        let items = match row.items_json {
            serde_json::Value::Null => Vec::new(),
            value => serde_json::from_value::<Vec<ReceiptItem>>(value).unwrap_or_else(|e| {
                warn!("Unreadable items on receipt {}: {}", row.id, e);
                Vec::new()
            }),
        };
        Self {
            id: row.id,
            user_id: row.user_id,
            store_name: row.store_name,
            total_amount: row.total_amount,
            purchase_date: row.purchase_date,
            items,
            created_at: row.created_at,
        }
    }
}

impl NewReceiptRow {
    pub fn new(owner: &str, domain: NewReceipt) -> Self {
        Self {
            user_id: owner.to_string(),
            store_name: domain.store_name,
            total_amount: domain.total_amount,
            purchase_date: domain.purchase_date,
            items_json: domain.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(items_json: &str) -> ReceiptRow {
        serde_json::from_str(&format!(
            r#"{{"id":"r1","user_id":"u1","store_name":"Carrefour","total_amount":23.4,
                "purchase_date":"2024-03-02","items_json":{},
                "created_at":"2024-03-02T09:00:00+00:00"}}"#,
            items_json
        ))
        .unwrap()
    }

    #[test]
    fn test_items_json_is_decoded() {
        let receipt = Receipt::from(row(r#"[{"name":"Pain","price":0},{"name":"Lait"}]"#));
        assert_eq!(receipt.total_amount, dec!(23.4));
        let names: Vec<_> = receipt.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Pain", "Lait"]);
    }

    #[test]
    fn test_missing_or_malformed_items_become_empty() {
        assert!(Receipt::from(row("null")).items.is_empty());
        assert!(Receipt::from(row(r#""not a list""#)).items.is_empty());
    }
}
