//! Receipt domain models.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Domain model representing a scanned or typed purchase receipt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: String,
    pub user_id: String,
    pub store_name: String,
    pub total_amount: Decimal,
    pub purchase_date: NaiveDate,
    pub items: Vec<ReceiptItem>,
    pub created_at: DateTime<Utc>,
}

/// A single line of a receipt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
}

/// Input model for recording a new receipt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewReceipt {
    pub store_name: String,
    pub total_amount: Decimal,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
}

impl NewReceipt {
    pub fn validate(&self) -> Result<()> {
        if self.store_name.trim().is_empty() {
            return Err(Error::missing_field("storeName"));
        }
        if self.total_amount.is_sign_negative() {
            return Err(Error::invalid_input(format!(
                "Receipt total must not be negative, got {}",
                self.total_amount
            )));
        }
        if let Some(item) = self
            .items
            .iter()
            .find(|i| i.name.trim().is_empty() || i.price.is_sign_negative())
        {
            return Err(Error::invalid_input(format!(
                "Invalid receipt item '{}' ({})",
                item.name, item.price
            )));
        }
        Ok(())
    }
}

/// Parses a free-text item list, one item per non-blank line.
///
/// Prices are not extracted from text and default to zero.
pub fn parse_items_text(text: &str) -> Vec<ReceiptItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| ReceiptItem {
            name: line.to_string(),
            price: Decimal::ZERO,
        })
        .collect()
}

/// First instant of the calendar month containing `now` (UTC).
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}
