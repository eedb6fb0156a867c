//! Product domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PRODUCT_CATEGORY, DEFAULT_PRODUCT_UNIT};
use crate::errors::{Error, Result};

/// Domain model representing an item held in the household stock
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub min_threshold: f64,
    pub unit: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// A product needs attention once its quantity drops to the alert threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_threshold
    }
}

/// Input model for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub quantity: f64,
    pub min_threshold: f64,
    pub unit: Option<String>,
}

impl NewProduct {
    /// Validates the input and fills in the default unit and category.
    pub fn normalized(self) -> Result<Self> {
        validate_fields(&self.name, self.quantity, self.min_threshold)?;
        Ok(Self {
            name: self.name.trim().to_string(),
            category: Some(non_blank_or(self.category, DEFAULT_PRODUCT_CATEGORY)),
            quantity: self.quantity,
            min_threshold: self.min_threshold,
            unit: Some(non_blank_or(self.unit, DEFAULT_PRODUCT_UNIT)),
        })
    }
}

/// Input model for updating an existing product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: f64,
    pub min_threshold: f64,
    pub unit: String,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::missing_field("id"));
        }
        validate_fields(&self.name, self.quantity, self.min_threshold)
    }
}

fn validate_fields(name: &str, quantity: f64, min_threshold: f64) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::missing_field("name"));
    }
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(Error::invalid_input(format!(
            "Quantity must be a non-negative number, got {}",
            quantity
        )));
    }
    if !min_threshold.is_finite() || min_threshold < 0.0 {
        return Err(Error::invalid_input(format!(
            "Alert threshold must be a non-negative number, got {}",
            min_threshold
        )));
    }
    Ok(())
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
